//! Render command.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use serde::Serialize;

use region_cache::CacheStats;
use region_client::{HtmlClient, RegionOutput, Services};
use region_core::{PageRequest, RequestId, Tag};
use region_data::MemoryProvider;

use super::RenderArgs;
use crate::context::Context;
use crate::output::cache_badge;

#[derive(Serialize)]
struct RenderReport<'a> {
    region: &'a str,
    passes: Vec<PassReport>,
    output: &'a RegionOutput,
    cache: CacheStats,
}

#[derive(Serialize)]
struct PassReport {
    pass: usize,
    data_calls: usize,
    elapsed_ms: f64,
}

/// Run the render command.
pub async fn run(args: RenderArgs, ctx: &Context) -> Result<()> {
    let provider = match &args.fixture {
        Some(path) => MemoryProvider::load(ctx.resolve_path(path))?,
        None => MemoryProvider::new(),
    };
    let provider = Arc::new(provider);

    let mut engine = storefront_regions::engine()?;
    if let Some(dir) = &args.templates {
        engine = engine.with_dir(ctx.resolve_path(dir))?;
    }
    ctx.output
        .debug(&format!("{} templates loaded", engine.template_names().len()));

    let services = Services::new(ctx.config.clone(), provider.clone(), Arc::new(engine))
        .with_registry(Arc::new(storefront_regions::registry()));
    let client = HtmlClient::new(Arc::new(services));

    let page = page_request(&args);
    let invalidate: Vec<Tag> = args.invalidate.iter().map(|t| Tag::new(t.as_str())).collect();
    let passes = args.repeat.max(1);

    let mut reports = Vec::with_capacity(passes);
    let mut last = None;
    for pass in 1..=passes {
        let mut page = page.clone();
        page.request_id = RequestId::generate();

        let calls = provider.calls();
        let started = Instant::now();
        let mut view = region_client::ViewContext::new(page);
        let output = client
            .render_view(&args.region, &args.uid, &mut view)
            .await
            .with_context(|| format!("Failed to render {}", args.region))?;
        let elapsed = started.elapsed();

        let data_calls = provider.calls() - calls;
        ctx.output.step(
            pass,
            passes,
            &format!(
                "{} {} in {:.2?}, {} data calls",
                args.region,
                cache_badge(data_calls == 0),
                elapsed,
                data_calls
            ),
        );
        reports.push(PassReport {
            pass,
            data_calls,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        });

        if pass == 1 && !invalidate.is_empty() {
            let removed = client.invalidate(&invalidate).await?;
            ctx.output
                .info(&format!("Invalidated {} cached fragments", removed));
        }
        last = Some(output);
    }

    let Some(output) = last else {
        return Ok(());
    };
    let stats = client.cache_stats().await;

    if ctx.output.is_json() {
        ctx.output.json(&RenderReport {
            region: &args.region,
            passes: reports,
            output: &output,
            cache: stats,
        });
        return Ok(());
    }

    if args.body_only {
        ctx.output.raw(&output.body);
        return Ok(());
    }

    if let Some(header) = &output.header {
        ctx.output.header("Header");
        ctx.output.raw(header);
    }
    ctx.output.header("Body");
    ctx.output.raw(&output.body);

    ctx.output.header("Dependencies");
    if output.tags.is_empty() {
        ctx.output.kv("tags", "(none)");
    }
    for tag in &output.tags {
        ctx.output.list_item(tag.as_str());
    }
    let expiry = output
        .expiry
        .map(|e| e.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    ctx.output.kv("expires", &expiry);

    ctx.output.header("Cache");
    ctx.output.kv("entries", &stats.entries.to_string());
    ctx.output.kv("hits", &stats.hits.to_string());
    ctx.output.kv("misses", &stats.misses.to_string());
    ctx.output.kv("stores", &stats.stores.to_string());
    ctx.output.kv("invalidations", &stats.invalidations.to_string());
    ctx.output
        .kv("hit rate", &format!("{:.1}%", stats.hit_rate() * 100.0));

    Ok(())
}

fn page_request(args: &RenderArgs) -> PageRequest {
    let mut page = PageRequest::new();
    for (name, value) in &args.params {
        page = page.with_param(name.as_str(), value.as_str());
    }
    for (name, value) in &args.vars {
        page = page.with_var(name.as_str(), value.clone());
    }
    if let Some(locale) = &args.locale {
        page = page.with_locale(locale.as_str());
    }
    if let Some(currency) = &args.currency {
        page = page.with_currency(currency.as_str());
    }
    page
}
