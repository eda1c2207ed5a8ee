//! # Lykeion Resolvers
//!
//! Concrete staged resolvers for the platform's domain objects (courses,
//! knowledge bases, assessments, student assessment results, assessment
//! templates, the student directory, global branding assets) and the
//! composed pipelines that chain them, built on the stage contract from
//! `lykeion-pipeline`.
//!
//! Every permission decision goes through the policy evaluator from
//! `lykeion-authz`; resolvers never encode group names themselves.

#![doc(html_root_url = "https://docs.rs/lykeion-resolvers/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assessments;
pub mod assets;
pub mod courses;
pub mod directory;
pub mod knowledge_base;
pub mod pipelines;
pub mod student_assessments;
pub mod templates;
