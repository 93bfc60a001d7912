/// Server identity and limits reported to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Reported by `buildInfo`, `getParameter` and `serverStatus`.
    pub version: String,
    /// Largest document the server accepts, in bytes.
    pub max_bson_object_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            version: "5.0.42".into(),
            max_bson_object_size: 16 * 1024 * 1024,
        }
    }
}

impl HandlerConfig {
    /// `version` split on dots and padded to four components, as in
    /// `buildInfo.versionArray`. Non-numeric parts read as 0.
    pub fn version_array(&self) -> [i32; 4] {
        let mut parts = [0; 4];
        for (slot, part) in parts.iter_mut().zip(self.version.split('.')) {
            *slot = part.parse().unwrap_or(0);
        }
        parts
    }
}
