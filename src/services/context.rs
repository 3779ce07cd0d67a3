/// Per-request identity passed down to services.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Identity provider user id (`sub` claim)
    pub user_id: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
