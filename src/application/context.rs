use std::net::IpAddr;

/// Per-request facts resolved once by the outermost stage and shared by the rest.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    /// Address of the connecting client, when one could be determined.
    pub client_ip: Option<IpAddr>,
    /// Address the forecast is about: the `ip` query override or the client address.
    pub subject_ip: String,
}

impl RequestContext {
    pub fn client_ip_label(&self) -> String {
        self.client_ip
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
