use std::net::IpAddr;

/// Raw request metadata the auth core needs: where the caller is, and
/// which cookies and headers it sent.
pub trait Carrier {
    /// Address of the socket peer, which may be a proxy.
    fn peer(&self) -> Option<IpAddr>;
    fn cookie(&self, name: &str) -> Option<String>;
    fn header(&self, name: &str) -> Option<String>;

    /// Client address used for session binding. Forwarding headers are
    /// honoured only when the peer is one of the `trusted` proxies; the
    /// client is then the rightmost `X-Forwarded-For` hop that is not itself
    /// trusted, falling back to `X-Real-IP` and finally the peer.
    fn ip(&self, trusted: &[IpAddr]) -> Option<IpAddr> {
        let peer = self.peer()?;
        if !trusted.contains(&peer) {
            return Some(peer);
        }
        self.header("X-Forwarded-For")
            .and_then(|hops| {
                hops.rsplit(',')
                    .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
                    .find(|hop| !trusted.contains(hop))
            })
            .or_else(|| {
                self.header("X-Real-IP")
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or(Some(peer))
    }
}

#[cfg(feature = "server")]
mod request {
    use super::*;
    use actix_web::HttpRequest;

    impl Carrier for HttpRequest {
        fn peer(&self) -> Option<IpAddr> {
            self.peer_addr().map(|a| a.ip())
        }
        fn cookie(&self, name: &str) -> Option<String> {
            HttpRequest::cookie(self, name).map(|c| c.value().to_owned())
        }
        fn header(&self, name: &str) -> Option<String> {
            self.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_owned())
        }
    }
}
