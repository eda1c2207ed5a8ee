//! Global branding asset resolvers.
//!
//! The platform keeps a single logo record under a fixed key; there is no
//! per-tenant variant. The write replaces the whole record, so a first
//! write and a later replacement go through the same path.

use lykeion_core::record::{self, Item};
use lykeion_core::{LykeionError, LykeionResult};
use lykeion_pipeline::{PipelineContext, Resolver, StoreOperation};
use lykeion_store::Key;
use serde_json::Value;

/// Fixed key of the singleton logo record.
pub const GLOBAL_ASSET_KEY: &str = "global";

/// The current logo record, or `null` when none was ever uploaded.
#[derive(Debug, Default)]
pub struct GetGlobalLogo;

impl Resolver for GetGlobalLogo {
    fn name(&self) -> &'static str {
        "get_global_logo"
    }

    fn request(&self, _ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        Ok(StoreOperation::Get {
            key: Key::simple(GLOBAL_ASSET_KEY),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Replaces the logo record with the given url and uploader, stamping the
/// upload time.
#[derive(Debug, Default)]
pub struct UpdateGlobalLogo;

impl Resolver for UpdateGlobalLogo {
    fn name(&self) -> &'static str {
        "update_global_logo"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let input = ctx.input_or_arguments();
        let (Some(logo_url), Some(uploaded_by)) = (
            input.get("logoUrl").and_then(Value::as_str),
            input.get("uploadedBy").and_then(Value::as_str),
        ) else {
            return Err(LykeionError::bad_request(
                "logoUrl and uploadedBy are required",
            ));
        };

        let mut item = Item::new();
        item.insert("id".to_string(), Value::String(GLOBAL_ASSET_KEY.to_string()));
        item.insert("logoUrl".to_string(), Value::String(logo_url.to_string()));
        item.insert(
            "uploadedBy".to_string(),
            Value::String(uploaded_by.to_string()),
        );
        item.insert(
            "uploadedAt".to_string(),
            Value::String(record::now_iso8601()),
        );

        Ok(StoreOperation::Put {
            key: Key::simple(GLOBAL_ASSET_KEY),
            item,
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}
