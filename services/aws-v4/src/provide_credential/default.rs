use super::{
    EcsCredentialProvider, EnvCredentialProvider, IMDSv2CredentialProvider,
    ProfileCredentialProvider,
};
use crate::Credential;
use async_trait::async_trait;
use awsreq_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Environment variables
/// 2. Shared config (`~/.aws/config`, `~/.aws/credentials`)
/// 3. ECS (IAM Roles for Tasks) & Container credentials
/// 4. EC2 IMDSv2
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ProfileCredentialProvider::new())
            .push(EcsCredentialProvider::new())
            .push(IMDSv2CredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        AWS_ACCESS_KEY_ID, AWS_CONFIG_FILE, AWS_SECRET_ACCESS_KEY, AWS_SHARED_CREDENTIALS_FILE,
    };
    use crate::StaticCredentialProvider;
    use awsreq_core::StaticEnv;
    use awsreq_file_read_tokio::TokioFileRead;

    fn testdata(name: &str) -> String {
        format!("{}/testdata/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn context(envs: &[(&str, String)]) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv::new(envs.iter().cloned()))
    }

    #[tokio::test]
    async fn test_credential_env_loader_without_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        // IMDS fails without an http client and is skipped.
        let x = DefaultCredentialProvider::new()
            .provide_credential(&context(&[]))
            .await
            .expect("load must succeed");
        assert!(x.is_none());
    }

    #[tokio::test]
    async fn test_credential_env_loader_with_env() {
        let ctx = context(&[
            (AWS_ACCESS_KEY_ID, "access_key_id".to_string()),
            (AWS_SECRET_ACCESS_KEY, "secret_access_key".to_string()),
            (AWS_CONFIG_FILE, testdata("default_config")),
        ]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("access_key_id", x.access_key_id);
        assert_eq!("secret_access_key", x.secret_access_key);
    }

    #[tokio::test]
    async fn test_credential_profile_loader_from_config() {
        let ctx = context(&[
            (AWS_CONFIG_FILE, testdata("default_config")),
            (AWS_SHARED_CREDENTIALS_FILE, testdata("not_exist")),
        ]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("config_access_key_id", x.access_key_id);
        assert_eq!("config_secret_access_key", x.secret_access_key);
    }

    /// AWS_SHARED_CREDENTIALS_FILE should be taken first.
    #[tokio::test]
    async fn test_credential_profile_loader_from_both() {
        let ctx = context(&[
            (AWS_CONFIG_FILE, testdata("default_config")),
            (AWS_SHARED_CREDENTIALS_FILE, testdata("default_credential")),
        ]);

        let x = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("shared_access_key_id", x.access_key_id);
        assert_eq!("shared_secret_access_key", x.secret_access_key);
    }

    #[tokio::test]
    async fn test_with_chain() {
        let provider = DefaultCredentialProvider::with_chain(
            ProvideCredentialChain::new()
                .push(EnvCredentialProvider::new())
                .push(StaticCredentialProvider::new("static_ak", "static_sk")),
        );

        let x = provider
            .provide_credential(&context(&[]))
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("static_ak", x.access_key_id);
    }
}
