use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use policydesk_client::HttpBackend;
use policydesk_controller::{
    ControllerSettings, FragmentView, LoadOutcome, SystemClock, ViewController,
};
use policydesk_core::{DeskConfig, NewPolicy, PolicyStatus};

const DEFAULT_CONFIG: &str = "policydesk.toml";

pub type DeskController<V> = ViewController<HttpBackend, V, SystemClock>;

/// Resolve configuration: explicit `--config`, else `./policydesk.toml`
/// when present, else defaults. `--base-url` wins over the file.
pub fn load_config(path: Option<&Path>, base_url: Option<&str>) -> anyhow::Result<DeskConfig> {
    let mut config = match path {
        Some(path) => DeskConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => DeskConfig::from_file(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("reading config {DEFAULT_CONFIG}"))?,
        None => DeskConfig::default(),
    };
    if let Some(url) = base_url {
        config.backend.base_url = url.to_string();
    }
    debug!(base_url = %config.backend.base_url, "configuration resolved");
    Ok(config)
}

pub fn controller<V: policydesk_controller::PolicyView>(
    config: &DeskConfig,
    view: V,
) -> anyhow::Result<DeskController<V>> {
    let backend = HttpBackend::new(
        &config.backend.base_url,
        config.backend.session_cookie.clone(),
    )?;
    info!(backend = %backend.address(), "using backend");
    Ok(ViewController::new(
        backend,
        view,
        SystemClock,
        ControllerSettings::from_ui(&config.ui),
    ))
}

async fn print_banners(ctl: &DeskController<FragmentView>) {
    for html in ctl.view().await.banners.values() {
        eprintln!("{html}");
    }
}

pub async fn list(
    config: &DeskConfig,
    search: Option<&str>,
    product: Option<&str>,
    status: Option<PolicyStatus>,
) -> anyhow::Result<()> {
    let ctl = controller(config, FragmentView::new())?;
    if ctl.load_policies().await == LoadOutcome::Failed {
        print_banners(&ctl).await;
        anyhow::bail!("could not load policies");
    }

    if let Some(term) = search {
        ctl.search(term).await;
    }
    if product.is_some() {
        ctl.set_product_filter(product).await;
    }
    if status.is_some() {
        ctl.set_status_filter(status).await;
    }

    if let Some(html) = &ctl.view().await.table_body {
        println!("{html}");
    }
    Ok(())
}

pub async fn salespeople(config: &DeskConfig) -> anyhow::Result<()> {
    let ctl = controller(config, FragmentView::new())?;
    if ctl.load_salespeople().await == LoadOutcome::Failed {
        print_banners(&ctl).await;
        anyhow::bail!("could not load salespeople");
    }
    if let Some(html) = &ctl.view().await.salesperson_select {
        println!("{html}");
    }
    Ok(())
}

pub async fn add(config: &DeskConfig, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let policy: NewPolicy = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", file.display()))?;

    let ctl = controller(config, FragmentView::new())?;
    let added = ctl.submit_policy(&policy).await;
    for html in ctl.view().await.banners.values() {
        println!("{html}");
    }
    if !added {
        anyhow::bail!("policy was not added");
    }
    Ok(())
}
