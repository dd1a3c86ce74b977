// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use object_store::{aws::AmazonS3Builder, local::LocalFileSystem, ObjectStore};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{BrandRepository, CategoryRepository, ProductRepository, RefreshTokenRepository, UserRepository, VariantRepository},
    services::{
        notifier::{LogNotifier, PasswordResetNotifier},
        upload_service::DEFAULT_MAX_CONCURRENCY,
        AuthService, BrandService, CategoryService, ProductService, TokenService, UploadService, VariantSyncEngine,
    },
};

#[derive(Debug, Clone)]
pub enum StorageBackend {
    S3 { bucket: String, region: String },
    Local { root: PathBuf },
}

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub http_addr: String,
    pub private_key_pem: Vec<u8>,
    pub public_key_pem: Vec<u8>,
    pub storage: StorageBackend,
    pub public_asset_base_url: Option<String>,
    pub upload_max_concurrency: usize,
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let private_key_pem = decode_key("PRIVATE_KEY_BASE64")?;
        let public_key_pem = decode_key("PUBLIC_KEY_BASE64")?;

        let storage = match env::var("STORAGE_BACKEND").unwrap_or_else(|_| "s3".to_string()).as_str() {
            "s3" => StorageBackend::S3 {
                bucket: env::var("AWS_S3_BUCKET").context("AWS_S3_BUCKET deve ser definido")?,
                region: env::var("AWS_REGION").context("AWS_REGION deve ser definida")?,
            },
            "local" => StorageBackend::Local {
                root: env::var("LOCAL_STORAGE_DIR").unwrap_or_else(|_| "./uploads".to_string()).into(),
            },
            other => anyhow::bail!("STORAGE_BACKEND inválido: '{other}' (use 's3' ou 'local')"),
        };

        Ok(Self {
            database_url,
            http_addr,
            private_key_pem,
            public_key_pem,
            storage,
            public_asset_base_url: env::var("PUBLIC_ASSET_BASE_URL").ok().filter(|url| !url.trim().is_empty()),
            upload_max_concurrency: env_or("UPLOAD_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            shutdown_grace: Duration::from_secs(env_or("SHUTDOWN_GRACE_SECS", 10)?),
        })
    }

    /// Base das URLs públicas dos arquivos enviados.
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.public_asset_base_url {
            return url.clone();
        }
        match &self.storage {
            StorageBackend::S3 { bucket, region } => format!("https://{bucket}.s3.{region}.amazonaws.com"),
            StorageBackend::Local { root } => format!("file://{}", root.display()),
        }
    }
}

fn decode_key(var: &str) -> anyhow::Result<Vec<u8>> {
    let encoded = env::var(var).with_context(|| format!("{var} deve ser definida"))?;
    STANDARD
        .decode(encoded.trim())
        .with_context(|| format!("{var} não é base64 válido"))
}

fn env_or<T>(var: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{var} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

pub fn build_object_store(storage: &StorageBackend) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match storage {
        StorageBackend::S3 { bucket, region } => {
            // Credenciais: AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY (ou role da instância)
            let s3 = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .with_region(region)
                .build()
                .context("Falha ao configurar o cliente S3")?;
            Ok(Arc::new(s3))
        }
        StorageBackend::Local { root } => {
            std::fs::create_dir_all(root)
                .with_context(|| format!("Falha ao criar o diretório {}", root.display()))?;
            // O prefixo precisa ser um caminho absoluto existente
            let root = root
                .canonicalize()
                .with_context(|| format!("Caminho inválido: {}", root.display()))?;
            Ok(Arc::new(LocalFileSystem::new_with_prefix(root)?))
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub token_service: TokenService,
    pub auth_service: AuthService,
    pub brand_service: BrandService,
    pub category_service: CategoryService,
    pub product_service: ProductService,
    pub variant_engine: VariantSyncEngine,
    pub upload_service: UploadService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(25)
            .max_lifetime(Duration::from_secs(5 * 60))
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let file_store = build_object_store(&config.storage)?;
        Self::build(db_pool, config, file_store, Arc::new(LogNotifier))
    }

    /// Monta o gráfico de dependências a partir de peças já prontas (usado também nos testes).
    pub fn build(
        db_pool: PgPool,
        config: &Config,
        file_store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn PasswordResetNotifier>,
    ) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);
        let token_service = TokenService::from_rsa_pem(&config.private_key_pem, &config.public_key_pem)?;

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = RefreshTokenRepository::new(db_pool.clone());
        let brand_repo = BrandRepository::new(db_pool.clone());
        let category_repo = CategoryRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let variant_repo = VariantRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo,
            session_repo,
            token_service.clone(),
            notifier,
            db_pool.clone(),
        );
        let upload_service = UploadService::new(
            file_store,
            config.public_base_url(),
            config.upload_max_concurrency,
            matches!(config.storage, StorageBackend::S3 { .. }),
        );

        Ok(Self {
            i18n_store,
            token_service,
            auth_service,
            brand_service: BrandService::new(brand_repo),
            category_service: CategoryService::new(category_repo, db_pool.clone()),
            product_service: ProductService::new(product_repo, db_pool.clone()),
            variant_engine: VariantSyncEngine::new(variant_repo, db_pool.clone()),
            upload_service,
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(storage: StorageBackend, public: Option<&str>) -> Config {
        Config {
            database_url: String::new(),
            http_addr: String::new(),
            private_key_pem: Vec::new(),
            public_key_pem: Vec::new(),
            storage,
            public_asset_base_url: public.map(str::to_owned),
            upload_max_concurrency: DEFAULT_MAX_CONCURRENCY,
            shutdown_grace: Duration::from_secs(10),
        }
    }

    #[test]
    fn public_url_prefers_explicit_setting() {
        let s3 = StorageBackend::S3 { bucket: "catalogo".into(), region: "sa-east-1".into() };
        assert_eq!(
            config(s3.clone(), None).public_base_url(),
            "https://catalogo.s3.sa-east-1.amazonaws.com"
        );
        assert_eq!(config(s3, Some("https://cdn.example.com")).public_base_url(), "https://cdn.example.com");
    }

    #[test]
    fn env_or_parses_or_falls_back() {
        assert_eq!(env_or::<usize>("CATALOG_TEST_VAR_QUE_NAO_EXISTE", 8).unwrap(), 8);
    }
}
