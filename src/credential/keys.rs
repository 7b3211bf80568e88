/// Which credential a cache entry holds.
///
/// Cache keys have the layout `{prefix}_{kind}_{identity}`. User-scoped
/// kinds are keyed by open_id, application-scoped kinds by client key.
/// Processes that share one cache rely on this layout, so it must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind<'a> {
    /// User access token for the given open_id.
    AccessToken(&'a str),
    /// User refresh token for the given open_id.
    RefreshToken(&'a str),
    /// Open platform application token.
    ClientToken,
    /// Mini app server-side application token.
    ServerToken,
    /// JS-API signing ticket.
    JsTicket,
}

impl CredentialKind<'_> {
    pub fn cache_key(&self, prefix: &str, client_key: &str) -> String {
        match self {
            CredentialKind::AccessToken(open_id) => format!("{prefix}_access_token_{open_id}"),
            CredentialKind::RefreshToken(open_id) => format!("{prefix}_refresh_token_{open_id}"),
            CredentialKind::ClientToken => format!("{prefix}_client_token_{client_key}"),
            CredentialKind::ServerToken => format!("{prefix}_server_client_token_{client_key}"),
            CredentialKind::JsTicket => format!("{prefix}_jsapi_ticket_{client_key}"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken(_) => "access_token",
            CredentialKind::RefreshToken(_) => "refresh_token",
            CredentialKind::ClientToken => "client_token",
            CredentialKind::ServerToken => "server_token",
            CredentialKind::JsTicket => "jsapi_ticket",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "bytedance_douyin_lite";

    #[test]
    fn test_user_keys() {
        assert_eq!(
            CredentialKind::AccessToken("u123").cache_key(PREFIX, "tt01"),
            "bytedance_douyin_lite_access_token_u123"
        );
        assert_eq!(
            CredentialKind::RefreshToken("u123").cache_key(PREFIX, "tt01"),
            "bytedance_douyin_lite_refresh_token_u123"
        );
    }

    #[test]
    fn test_app_keys() {
        assert_eq!(
            CredentialKind::ClientToken.cache_key(PREFIX, "tt01"),
            "bytedance_douyin_lite_client_token_tt01"
        );
        assert_eq!(
            CredentialKind::ServerToken.cache_key(PREFIX, "tt01"),
            "bytedance_douyin_lite_server_client_token_tt01"
        );
        assert_eq!(
            CredentialKind::JsTicket.cache_key(PREFIX, "tt01"),
            "bytedance_douyin_lite_jsapi_ticket_tt01"
        );
    }

    #[test]
    fn test_user_key_ignores_client_key() {
        let a = CredentialKind::AccessToken("u1").cache_key("p", "tt01");
        let b = CredentialKind::AccessToken("u1").cache_key("p", "tt02");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_identities_distinct_keys() {
        let kinds = [
            CredentialKind::AccessToken("u1"),
            CredentialKind::AccessToken("u2"),
            CredentialKind::RefreshToken("u1"),
            CredentialKind::RefreshToken("u2"),
            CredentialKind::ClientToken,
            CredentialKind::ServerToken,
            CredentialKind::JsTicket,
        ];
        let keys: std::collections::HashSet<String> =
            kinds.iter().map(|kind| kind.cache_key(PREFIX, "tt01")).collect();
        assert_eq!(keys.len(), kinds.len());
    }
}
