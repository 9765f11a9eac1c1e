//! Logger deny-lists.
//!
//! Noise entries are matched against both a structured entry's
//! `payload.logger` and the entry's `type`. `text/plain` is deliberately
//! absent: excluding it would also hide IDM script output.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{SyncError, SyncResult};

pub const MISC_NOISE: &[&str] = &[
    "com.iplanet.dpro.session.operations.ServerSessionOperationStrategy",
    "com.iplanet.dpro.session.SessionIDFactory",
    "com.iplanet.dpro.session.share.SessionEncodeURL",
    "com.iplanet.services.naming.WebtopNaming",
    "com.iplanet.sso.providers.dpro.SSOProviderImpl",
    "com.sun.identity.authentication.AuthContext",
    "com.sun.identity.authentication.client.AuthClientUtils",
    "com.sun.identity.authentication.config.AMAuthConfigType",
    "com.sun.identity.authentication.config.AMAuthenticationManager",
    "com.sun.identity.authentication.config.AMAuthLevelManager",
    "com.sun.identity.authentication.config.AMConfiguration",
    "com.sun.identity.authentication.jaas.LoginContext",
    "com.sun.identity.authentication.modules.application.Application",
    "com.sun.identity.authentication.server.AuthContextLocal",
    "com.sun.identity.authentication.service.AMLoginContext",
    "com.sun.identity.authentication.service.AuthContextLookup",
    "com.sun.identity.authentication.service.AuthD",
    "com.sun.identity.authentication.service.AuthUtils",
    "com.sun.identity.authentication.service.DSAMECallbackHandler",
    "com.sun.identity.authentication.service.LoginState",
    "com.sun.identity.authentication.spi.AMLoginModule",
    "com.sun.identity.delegation.DelegationEvaluatorImpl",
    "com.sun.identity.idm.plugins.internal.AgentsRepo",
    "com.sun.identity.idm.server.IdCachedServicesImpl",
    "com.sun.identity.idm.server.IdRepoPluginsCache",
    "com.sun.identity.idm.server.IdServicesImpl",
    "com.sun.identity.log.spi.ISDebug",
    "com.sun.identity.shared.encode.CookieUtils",
    "com.sun.identity.sm.ldap.SMSLdapObject",
    "com.sun.identity.sm.CachedSMSEntry",
    "com.sun.identity.sm.CachedSubEntries",
    "com.sun.identity.sm.DNMapper",
    "com.sun.identity.sm.ServiceConfigImpl",
    "com.sun.identity.sm.ServiceConfigManagerImpl",
    "com.sun.identity.sm.SMSEntry",
    "com.sun.identity.sm.SMSUtils",
    "com.sun.identity.sm.SmsWrapperObject",
    "oauth2",
    "org.apache.http.client.protocol.RequestAuthCache",
    "org.apache.http.impl.conn.PoolingHttpClientConnectionManager",
    "org.apache.http.impl.nio.client.InternalHttpAsyncClient",
    "org.apache.http.impl.nio.client.InternalIODispatch",
    "org.apache.http.impl.nio.client.MainClientExec",
    "org.apache.http.impl.nio.conn.ManagedNHttpClientConnectionImpl",
    "org.apache.http.impl.nio.conn.PoolingNHttpClientConnectionManager",
    "org.forgerock.audit.AuditServiceImpl",
    "org.forgerock.oauth2.core.RealmOAuth2ProviderSettings",
    "org.forgerock.openam.authentication.service.JAASModuleDetector",
    "org.forgerock.openam.authentication.service.LoginContextFactory",
    "org.forgerock.openam.blacklist.BloomFilterBlacklist",
    "org.forgerock.openam.blacklist.CTSBlacklist",
    "org.forgerock.openam.core.realms.impl.CachingRealmLookup",
    "org.forgerock.openam.core.rest.authn.RestAuthCallbackHandlerManager",
    "org.forgerock.openam.core.rest.authn.trees.AuthTrees",
    "org.forgerock.openam.cors.CorsFilter",
    "org.forgerock.openam.cts.CTSPersistentStoreImpl",
    "org.forgerock.openam.cts.impl.CoreTokenAdapter",
    "org.forgerock.openam.cts.impl.queue.AsyncResultHandler",
    "org.forgerock.openam.cts.reaper.ReaperDeleteOnQueryResultHandler",
    "org.forgerock.openam.headers.DisableSameSiteCookiesFilter",
    "org.forgerock.openam.idrepo.ldap.DJLDAPv3Repo",
    "org.forgerock.openam.rest.CsrfFilter",
    "org.forgerock.openam.rest.restAuthenticationFilter",
    "org.forgerock.openam.rest.fluent.CrestLoggingFilter",
    "org.forgerock.openam.session.cts.CtsOperations",
    "org.forgerock.openam.session.stateless.StatelessSessionManager",
    "org.forgerock.openam.sm.datalayer.impl.ldap.ExternalLdapConfig",
    "org.forgerock.openam.sm.datalayer.impl.ldap.LdapQueryBuilder",
    "org.forgerock.openam.sm.datalayer.impl.SeriesTaskExecutor",
    "org.forgerock.openam.sm.datalayer.impl.SeriesTaskExecutorThread",
    "org.forgerock.openam.sm.datalayer.providers.LdapConnectionFactoryProvider",
    "org.forgerock.openam.sm.file.ConfigFileSystemHandler",
    "org.forgerock.openam.social.idp.SocialIdentityProviders",
    "org.forgerock.openam.utils.ClientUtils",
    "org.forgerock.opendj.ldap.CachedConnectionPool",
    "org.forgerock.opendj.ldap.LoadBalancer",
    "org.forgerock.secrets.keystore.KeyStoreSecretStore",
    "org.forgerock.secrets.propertyresolver.PropertyResolverSecretStore",
    "org.forgerock.secrets.SecretsProvider",
];

pub const SAML_NOISE: &[&str] = &[
    "com.sun.identity.cot.COTCache",
    "com.sun.identity.plugin.configuration.impl.ConfigurationInstanceImpl",
    "com.sun.identity.saml2.meta.SAML2MetaCache",
    "com.sun.identity.saml2.profile.CacheCleanUpRunnable",
    "org.apache.xml.security.keys.KeyInfo",
    "org.apache.xml.security.signature.XMLSignature",
    "org.apache.xml.security.utils.SignerOutputStream",
    "org.apache.xml.security.utils.resolver.ResourceResolver",
    "org.apache.xml.security.utils.resolver.implementations.ResolverFragment",
    "org.apache.xml.security.algorithms.JCEMapper",
    "org.apache.xml.security.algorithms.implementations.SignatureBaseRSA",
    "org.apache.xml.security.algorithms.SignatureAlgorithm",
    "org.apache.xml.security.utils.ElementProxy",
    "org.apache.xml.security.transforms.Transforms",
    "org.apache.xml.security.utils.DigesterOutputStream",
    "org.apache.xml.security.signature.Reference",
    "org.apache.xml.security.signature.Manifest",
];

pub const JOURNEY_NOISE: &[&str] = &["org.forgerock.openam.auth.trees.engine.AuthTreeExecutor"];

/// Set of logger names and entry types to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFilter {
    entries: HashSet<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::default_set()
    }
}

impl NoiseFilter {
    /// Miscellaneous, SAML and journey deny-lists combined.
    pub fn default_set() -> Self {
        Self::from_entries(
            MISC_NOISE
                .iter()
                .chain(SAML_NOISE)
                .chain(JOURNEY_NOISE)
                .copied(),
        )
    }

    /// A filter that drops nothing.
    pub fn empty() -> Self {
        Self {
            entries: HashSet::new(),
        }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Load an override list: a JSON array of logger names.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        let entries: Vec<String> = serde_json::from_str(&text)
            .map_err(|e| SyncError::json(path.display().to_string(), e))?;
        Ok(Self::from_entries(entries))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_union_of_lists() {
        let filter = NoiseFilter::default_set();
        assert_eq!(
            filter.len(),
            MISC_NOISE.len() + SAML_NOISE.len() + JOURNEY_NOISE.len()
        );
        assert!(filter.contains("org.forgerock.openam.auth.trees.engine.AuthTreeExecutor"));
        assert!(filter.contains("com.sun.identity.cot.COTCache"));
        assert!(filter.contains("oauth2"));
        assert!(!filter.contains("text/plain"));
    }

    #[test]
    fn test_load_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.json");
        std::fs::write(&path, r#"["org.example.Chatty"]"#).unwrap();
        let filter = NoiseFilter::load(&path).unwrap();
        assert_eq!(filter.len(), 1);
        assert!(filter.contains("org.example.Chatty"));
        assert!(!filter.contains("oauth2"));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.json");
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        assert!(matches!(NoiseFilter::load(&path), Err(SyncError::Json { .. })));
    }
}
