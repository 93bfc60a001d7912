use bson::Document;
use loam_db::{CommandError, Handler};
use loam_store::Store;

/// One client conversation: JSON command in, JSON reply out.
pub struct Session<S: Store> {
    handler: Handler<S>,
    default_db: String,
}

impl<S: Store> Session<S> {
    pub fn new(handler: Handler<S>, default_db: String) -> Self {
        Self {
            handler,
            default_db,
        }
    }

    pub fn handler(&self) -> &Handler<S> {
        &self.handler
    }

    /// Parse a command (extended JSON is understood), run it with `$db`
    /// defaulted, and encode the reply.
    pub fn handle_line(&self, line: &str) -> String {
        let reply = match serde_json::from_str::<Document>(line) {
            Ok(mut request) => {
                if !request.contains_key("$db") {
                    request.insert("$db", self.default_db.as_str());
                }
                self.handler.handle(&request)
            }
            Err(e) => CommandError::BadValue(format!("invalid JSON command: {e}"))
                .to_document(),
        };
        serde_json::to_string(&reply).unwrap_or_else(|e| {
            tracing::error!("failed to encode reply: {e}");
            r#"{"ok":0.0,"errmsg":"failed to encode reply","code":1,"codeName":"InternalError"}"#
                .to_string()
        })
    }
}
