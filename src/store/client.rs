use crate::config::StoreConfig;
use crate::matcher::RecipeId;
use crate::store::{models::StoreRecipe, RecipeSource};
use crate::{Error, Result};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Client for the recipe store REST API
#[derive(Clone)]
pub struct HttpRecipeStore {
    client: Client,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HttpRecipeStore {
    /// Create a new recipe store client
    pub fn new(config: &StoreConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(token) = &config.api_token {
            let auth_value = format!("Bearer {token}");
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("Invalid recipe store token: {e}")))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
        })
    }

    /// Fetch every recipe in the store
    pub async fn list_recipes(&self) -> Result<Vec<StoreRecipe>> {
        self.get("/recipes").await
    }

    /// Fetch a single recipe
    pub async fn get_recipe(&self, recipe_id: RecipeId) -> Result<StoreRecipe> {
        self.get(&format!("/recipes/{recipe_id}")).await
    }

    /// GET with retry and exponential backoff on transport failures
    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match self.get_once(path).await {
                Ok(value) => return Ok(value),
                Err(e) if retries < self.max_retries && Self::is_retryable(&e) => {
                    retries += 1;
                    warn!(
                        "Recipe store request failed (attempt {}/{}): {}. Retrying in {:?}",
                        retries, self.max_retries, e, backoff
                    );
                    sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Recipe store request: GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            error!("Recipe store error: {} - {}", status, error_body);

            return Err(match status {
                StatusCode::NOT_FOUND => Error::NotFound(format!("Recipe store resource {path}")),
                _ => Error::RecipeStore(format!("HTTP {status} for {path}")),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::RecipeStore(format!("Failed to parse response for {path}: {e}")))
    }

    fn is_retryable(error: &Error) -> bool {
        match error {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl RecipeSource for HttpRecipeStore {
    async fn recipe_ids(&self) -> Result<Vec<RecipeId>> {
        let recipes = self.list_recipes().await?;
        Ok(recipes.into_iter().map(|r| r.id).collect())
    }

    async fn recipe_ingredients(&self, recipe_id: RecipeId) -> Result<Vec<String>> {
        let recipe = self.get_recipe(recipe_id).await?;
        Ok(recipe.ingredient_names())
    }
}
