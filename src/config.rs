/// Host window configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            title: "BlendInt".into(),
            width: 1280,
            height: 800,
        }
    }
}

impl HostConfig {
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
