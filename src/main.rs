use std::sync::Arc;

use anyhow::Context;
use loomi_client::{
    api::HttpBackend,
    config::Config,
    models::Category,
    services::{BrowseController, Recommendations, SessionStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "loomi_client=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let backend = Arc::new(HttpBackend::from_config(&config).context("Failed to build backend client")?);

    let session = Arc::new(SessionStore::new(backend.clone(), config.session_ttl()));
    let browse = BrowseController::from_config(backend.clone(), &config);

    if let Err(e) = browse.load_genre_options().await {
        tracing::warn!(error = %e, "Using default genres");
    }

    for category in [Category::Movies, Category::Shows] {
        browse.select_category(category).await;
        let view = browse.view().await;

        match &view.message {
            Some(message) => println!("{}: {}", category, message.text),
            None => println!("{}: {} items", category, view.items.len()),
        }
        for item in &view.featured {
            println!("  featured: {}", item.title());
        }
    }
    browse.close().await;

    if let (Some(email), Some(password)) = (&config.email, &config.password) {
        match session.login(email, password).await {
            Ok(signed_in) => {
                println!("Signed in as {}", signed_in.first_name);
                let recommendations = Recommendations::new(backend.clone(), session.clone());
                for category in [Category::Movies, Category::Shows] {
                    match recommendations.load(category).await {
                        Ok(items) => println!("Recommended {}: {} items", category, items.len()),
                        Err(e) => println!("Recommended {}: {}", category, e.user_message()),
                    }
                }
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }

    Ok(())
}
