//! The two batch runs: scrape-and-clean, and per-URL prediction.
//!
//! Both share the input staging step (resources directory, newest zip,
//! URL export) and differ only in what happens to the URL set afterwards.

use crate::layout::Layout;
use harvest_common::{HarvestError, Result};
use harvest_config::{ConfigStatus, HarvestConfig, MissingConfigPolicy, ensure_config, load_config};
use harvest_predict::predictor_from_config;
use harvest_predict::traits::Predictor;
use harvest_web::archive::{
    ArchiveSelector, NewestCreated, ResourcesState, ensure_resources_dir, extract_archive,
    find_archive,
};
use harvest_web::fetch::{FetchSettings, WebFetcher};
use harvest_web::pages::{clean_pages, read_raw_pages, write_cleaned_pages, write_raw_pages};
use harvest_web::politeness::{PolitenessPolicy, RandomizedPoliteness};
use harvest_web::urls::{CsvSelector, FirstWithoutSuffix, UrlSet, find_url_csv, read_url_set};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum RunOutcome {
    Scraped(ScrapeSummary),
    Predicted(PredictSummary),
    /// The config template was written; fill it in and run again.
    ConfigTemplateCreated(PathBuf),
    /// The resources directory was created empty.
    ResourcesDirCreated(PathBuf),
    /// No archive or no usable CSV was found.
    MissingInput(HarvestError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub urls: usize,
    pub failed: usize,
    pub cleaned: usize,
    pub raw_pages_file: PathBuf,
    pub cleaned_pages_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictSummary {
    pub urls: usize,
    pub predictions: usize,
}

impl RunOutcome {
    /// Process exit status: 2 for missing input, 0 otherwise.
    pub fn exit_status(&self) -> u8 {
        match self {
            RunOutcome::MissingInput(_) => 2,
            _ => 0,
        }
    }

    /// Tell the user what happened and what to do next.
    pub fn report(&self) {
        match self {
            RunOutcome::Scraped(s) => tracing::info!(
                urls = s.urls,
                failed = s.failed,
                cleaned = s.cleaned,
                raw = %s.raw_pages_file.display(),
                cleaned_file = %s.cleaned_pages_file.display(),
                "Scrape finished"
            ),
            RunOutcome::Predicted(s) => tracing::info!(
                urls = s.urls,
                predictions = s.predictions,
                "Prediction run finished"
            ),
            RunOutcome::ConfigTemplateCreated(path) => tracing::warn!(
                path = %path.display(),
                "Config file created. Fill in the values and run again"
            ),
            RunOutcome::ResourcesDirCreated(path) => tracing::warn!(
                path = %path.display(),
                "Place the zip export with the URL CSV into the resources directory and run again"
            ),
            RunOutcome::MissingInput(err) => tracing::error!(error = %err, "Input not found"),
        }
    }
}

/// Strategies for picking the archive and the CSV inside it.
pub struct InputSelectors {
    pub archive: Box<dyn ArchiveSelector>,
    pub csv: Box<dyn CsvSelector>,
}

impl Default for InputSelectors {
    fn default() -> Self {
        Self {
            archive: Box::new(NewestCreated),
            csv: Box::new(FirstWithoutSuffix::default()),
        }
    }
}

pub struct ScrapeOptions {
    pub selectors: InputSelectors,
    pub politeness: Arc<dyn PolitenessPolicy>,
    /// Timeout and proxy behavior; explicit proxies come from the config.
    pub fetch: FetchSettings,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            selectors: InputSelectors::default(),
            politeness: Arc::new(RandomizedPoliteness::default()),
            fetch: FetchSettings::default(),
        }
    }
}

#[derive(Default)]
pub struct PredictOptions {
    pub selectors: InputSelectors,
    /// Built from the config and the access token when `None`.
    pub predictor: Option<Arc<dyn Predictor>>,
}

enum Staged {
    Ready(UrlSet),
    Stop(RunOutcome),
}

/// Resources dir, newest zip extracted into `temp/`, URL set from the CSV.
fn stage_input(layout: &Layout, config: &HarvestConfig, selectors: &InputSelectors) -> Result<Staged> {
    if ensure_resources_dir(&layout.resources_dir)? == ResourcesState::Created {
        return Ok(Staged::Stop(RunOutcome::ResourcesDirCreated(
            layout.resources_dir.clone(),
        )));
    }

    let archive = match find_archive(&layout.resources_dir, selectors.archive.as_ref()) {
        Ok(path) => path,
        Err(e) if e.is_missing_input() => return Ok(Staged::Stop(RunOutcome::MissingInput(e))),
        Err(e) => return Err(e),
    };
    let entries = extract_archive(&archive, &layout.temp_dir)?;
    tracing::info!(archive = %archive.display(), entries, "Archive extracted");

    let csv = match find_url_csv(&layout.temp_dir, selectors.csv.as_ref()) {
        Ok(path) => path,
        Err(e) if e.is_missing_input() => return Ok(Staged::Stop(RunOutcome::MissingInput(e))),
        Err(e) => return Err(e),
    };
    let urls = read_url_set(&csv, &config.exclude_urls_with_string)?;
    tracing::info!(csv = %csv.display(), urls = urls.len(), "URLs loaded");
    Ok(Staged::Ready(urls))
}

/// Fetch every URL from the export and persist raw and cleaned page maps.
pub async fn run_scrape(layout: &Layout, options: ScrapeOptions) -> Result<RunOutcome> {
    let status = ensure_config(&layout.config_file)?;
    if MissingConfigPolicy::Exit.should_stop(status) {
        return Ok(RunOutcome::ConfigTemplateCreated(layout.config_file.clone()));
    }
    let config = load_config(&layout.config_file)?;

    let urls = match stage_input(layout, &config, &options.selectors)? {
        Staged::Ready(urls) => urls,
        Staged::Stop(outcome) => return Ok(outcome),
    };

    let settings = FetchSettings {
        proxies: config
            .proxies
            .iter()
            .map(|(scheme, url)| (scheme.to_string(), url.to_string()))
            .collect(),
        ..options.fetch
    };
    let fetcher = WebFetcher::new(&settings, options.politeness)
        .map_err(|e| HarvestError::Config(format!("page fetcher: {e}")))?;

    let raw = fetcher.fetch_all(&urls).await;
    write_raw_pages(&layout.raw_pages_file, &raw)?;
    tracing::info!(path = %layout.raw_pages_file.display(), "Raw pages saved");

    let raw = read_raw_pages(&layout.raw_pages_file)?;
    let cleaned = clean_pages(&raw);
    write_cleaned_pages(&layout.cleaned_pages_file, &cleaned)?;
    tracing::info!(path = %layout.cleaned_pages_file.display(), "Cleaned pages saved");

    Ok(RunOutcome::Scraped(ScrapeSummary {
        urls: urls.len(),
        failed: raw.values().filter(|html| html.is_none()).count(),
        cleaned: cleaned.len(),
        raw_pages_file: layout.raw_pages_file.clone(),
        cleaned_pages_file: layout.cleaned_pages_file.clone(),
    }))
}

/// Ask the prediction endpoint about every URL and print each answer to `out`.
///
/// The first failed prediction aborts the run.
pub async fn run_predict(
    layout: &Layout,
    options: PredictOptions,
    out: &mut impl Write,
) -> Result<RunOutcome> {
    if ensure_config(&layout.config_file)? == ConfigStatus::Created {
        tracing::warn!(
            path = %layout.config_file.display(),
            "Config file was missing; continuing with template values"
        );
    }
    let config = load_config(&layout.config_file)?;
    if config.has_placeholders() {
        tracing::warn!("Config still contains placeholder values");
    }

    let urls = match stage_input(layout, &config, &options.selectors)? {
        Staged::Ready(urls) => urls,
        Staged::Stop(outcome) => return Ok(outcome),
    };

    let predictor: Arc<dyn Predictor> = match options.predictor {
        Some(p) => p,
        None => predictor_from_config(&config)?,
    };
    tracing::info!(endpoint = predictor.endpoint_name(), urls = urls.len(), "Predicting");

    let mut total = 0;
    for url in urls.iter() {
        let predictions = predictor.predict(url).await?;
        total += predictions.len();
        writeln!(out, "Prediction for {url}:")?;
        writeln!(out, "{}", harvest_common::json::to_pretty_string(&predictions)?)?;
    }

    Ok(RunOutcome::Predicted(PredictSummary {
        urls: urls.len(),
        predictions: total,
    }))
}
