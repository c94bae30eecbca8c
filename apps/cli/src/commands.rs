use crate::args::{Cli, Command};
use crate::settings::Settings;
use anyhow::Context as _;
use ncr_flags::FlagSource;
use ncr_search::{
    Context, Environment, GatedSearchFacade, MemorySearch, Node, ParsedQuery, QName,
    SearchBackend, SearchRequest, SearchResponse, TENANT_ID_KEY,
};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Executes the parsed command, writing results to `out`.
///
/// Every write goes through a [`GatedSearchFacade`] over an in-process index,
/// so the printed storage sizes show whether indexing was suppressed.
///
/// # Errors
/// Fails on unreadable input, invalid flag configuration, or a search error.
pub fn run(
    cli: &Cli,
    settings: &Settings,
    environment: impl Environment + 'static,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let flags: Arc<dyn FlagSource> =
        settings.flags.to_source().context("Invalid [flags] table")?.into();

    let search = GatedSearchFacade::builder()
        .flags(Arc::clone(&flags))
        .backend(MemorySearch::new())
        .context(cli.execution_context())
        .environment(environment)
        .config(&settings.search)
        .build();

    match &cli.command {
        Command::Reindex { input, tenant } => {
            let context = request_context(tenant.as_deref());
            for qname in index_file(&search, input, &context)? {
                writeln!(out, "{}", search.describe_storage(&qname, &context)?)?;
            }
        },
        Command::Search { input, tenant, qnames, page, count, query } => {
            let context = request_context(tenant.as_deref());
            index_file(&search, input, &context)?;

            let request = SearchRequest::new(query.as_str()).with_page(*page).with_count(*count);
            let parsed = ParsedQuery::parse(&request.query);
            let mut response = SearchResponse::default();
            search.search_nodes(&request, &parsed, &mut response, qnames, &context)?;

            serde_json::to_writer_pretty(&mut *out, &response)?;
            writeln!(out)?;
        },
        Command::Flag { name } => match flags.get(name)? {
            Some(value) => writeln!(out, "{name} = {value}")?,
            None => writeln!(out, "{name} is not set")?,
        },
    }

    Ok(())
}

fn request_context(tenant: Option<&str>) -> Context {
    tenant.map(|t| Context::from([(TENANT_ID_KEY.to_owned(), t.to_owned())])).unwrap_or_default()
}

fn read_nodes(path: &Path) -> anyhow::Result<Vec<Node>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read nodes from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed node list in {}", path.display()))
}

/// Creates a storage per qname in the file, then indexes all nodes in one call.
fn index_file(
    search: &impl SearchBackend<Error = ncr_search::SearchError>,
    path: &Path,
    context: &Context,
) -> anyhow::Result<BTreeSet<QName>> {
    let nodes = read_nodes(path)?;
    let qnames: BTreeSet<QName> = nodes.iter().map(|n| n.node_ref.qname().clone()).collect();

    for qname in &qnames {
        search.create_storage(qname, context)?;
    }
    search.index_nodes(&nodes, context)?;

    info!(nodes = nodes.len(), storages = qnames.len(), "Submitted nodes for indexing");
    Ok(qnames)
}
