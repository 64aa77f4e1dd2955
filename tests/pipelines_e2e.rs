use docscrape::config::Config;
use docscrape::fetcher::{CachedSession, DiskCache};
use docscrape::output::{render_lines, write_results_file};
use docscrape::pipelines::{
    PipelineError, PipelineOutput, PipelineRegistry, archive::save_archive,
};
use docscrape::table::ResultTable;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const WHATSNEW_INDEX: &str = r#"<html><body>
<section id="what-s-new-in-python"><h1>What’s New in Python</h1>
<div class="toctree-wrapper compound"><ul>
<li class="toctree-l1"><a class="reference internal" href="3.12.html">What’s New In Python 3.12</a></li>
<li class="toctree-l1"><a class="reference internal" href="3.11.html">What’s New In Python 3.11</a></li>
<li class="toctree-l1"><a class="reference internal" href="missing.html">Gone</a></li>
</ul></div></section></body></html>"#;

const DOCS_ROOT: &str = r#"<html><body><div class="sphinxsidebar"><div class="sphinxsidebarwrapper">
<h3>Docs by version</h3>
<ul>
<li><a href="https://docs.python.org/3.13/">Python 3.13 (stable)</a></li>
<li><a href="https://docs.python.org/3.12/">Python 3.12 (security-fixes)</a></li>
<li><a href="https://www.python.org/doc/versions/">All versions</a></li>
</ul></div></div></body></html>"#;

const DOWNLOADS: &str = r#"<html><body><div class="body" role="main">
<table class="docutils align-default"><tr><td>PDF (A4 paper size)</td>
<td><a class="reference external" href="archives/python-3.13.0-docs-pdf-a4.zip">Download</a></td>
<td><a class="reference external" href="archives/python-3.13.0-docs-pdf-a4.tar.bz2">Download</a></td></tr>
</table></div></body></html>"#;

const PEP_INDEX: &str = r#"<html><body><section id="numerical-index"><h2>Numerical Index</h2>
<table class="pep-zero-table docutils align-default">
<thead><tr class="row-odd"><th class="head">Status</th><th class="head">PEP</th><th class="head">Title</th></tr></thead>
<tbody>
<tr class="row-even"><td><abbr title="Process, Active">PA</abbr></td><td><a class="pep reference internal" href="pep-0001/">1</a></td><td>PEP Purpose</td></tr>
<tr class="row-odd"><td><abbr title="Standards Track, Final">SF</abbr></td><td><a class="pep reference internal" href="pep-0008/">8</a></td><td>Style Guide</td></tr>
<tr class="row-even"><td><abbr title="Standards Track, Deferred">SD</abbr></td><td><a class="pep reference internal" href="pep-0484/">484</a></td><td>Type Hints</td></tr>
</tbody></table></section></body></html>"#;

fn article(version: &str) -> String {
    format!(
        "<html><body><h1>What’s New In Python {version}</h1>\n<dl class=\"field-list simple\">\n<dt>Editor</dt>\n<dd>Someone</dd>\n</dl></body></html>"
    )
}

fn pep(status: &str) -> String {
    format!(
        "<html><body><section id=\"pep-content\"><dl class=\"rfc2822 field-list simple\">\n<dt class=\"field-odd\">Status<span class=\"colon\">:</span></dt>\n<dd class=\"field-odd\"><abbr>{status}</abbr></dd>\n</dl></section></body></html>"
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.into_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn fake_site() -> MockServer {
    let server = MockServer::start().await;
    mount_html(&server, "/3/whatsnew/", WHATSNEW_INDEX.to_string()).await;
    mount_html(&server, "/3/whatsnew/3.12.html", article("3.12")).await;
    mount_html(&server, "/3/whatsnew/3.11.html", article("3.11")).await;
    mount_html(&server, "/3/", DOCS_ROOT.to_string()).await;
    mount_html(&server, "/3/download.html", DOWNLOADS.to_string()).await;
    mount_html(&server, "/peps/", PEP_INDEX.to_string()).await;
    mount_html(&server, "/peps/pep-0001/", pep("Active")).await;
    mount_html(&server, "/peps/pep-0008/", pep("Final")).await;
    mount_html(&server, "/peps/pep-0484/", pep("Final")).await;
    Mock::given(method("GET"))
        .and(path("/3/archives/python-3.13.0-docs-pdf-a4.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"PK\x03\x04pdf".to_vec())
                .insert_header("Content-Type", "application/zip"),
        )
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer, base_dir: &std::path::Path) -> Config {
    Config::new(
        &format!("{}/3/", server.uri()),
        &format!("{}/peps/", server.uri()),
        base_dir,
        0,
    )
    .unwrap()
}

async fn run_table(config: &Config, session: &CachedSession, kind: &str) -> ResultTable {
    let registry = PipelineRegistry::with_defaults(config);
    match registry.get(kind).unwrap().run(session).await.unwrap() {
        PipelineOutput::Table(table) => table,
        other => panic!("expected a table for {kind}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_whats_new_end_to_end() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));

    let table = run_table(&config, &session, "whats-new").await;

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.rows()[0][0],
        format!("{}/3/whatsnew/3.12.html", server.uri())
    );
    assert_eq!(table.rows()[0][1], "What’s New In Python 3.12");
    assert_eq!(table.rows()[0][2], " Editor Someone ");
}

#[tokio::test]
async fn test_latest_versions_end_to_end() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));

    let table = run_table(&config, &session, "latest-versions").await;

    assert_eq!(
        render_lines(&table),
        "link version status\n\
         https://docs.python.org/3.13/ 3.13 stable\n\
         https://docs.python.org/3.12/ 3.12 security-fixes\n\
         https://www.python.org/doc/versions/ All versions \n"
    );
}

#[tokio::test]
async fn test_pep_end_to_end() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));

    let table = run_table(&config, &session, "pep").await;

    assert_eq!(table.header(), ["status", "count"]);
    assert_eq!(table.rows()[0], ["Active", "1"]);
    assert_eq!(table.rows()[1], ["Final", "2"]);
    assert_eq!(table.rows()[2], ["Total", "3"]);
}

#[tokio::test]
async fn test_download_end_to_end() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));
    let registry = PipelineRegistry::with_defaults(&config);

    let PipelineOutput::Archive(link) = registry
        .get("download")
        .unwrap()
        .run(&session)
        .await
        .unwrap()
    else {
        panic!("expected an archive link");
    };
    let saved = save_archive(&session, &link, &config.downloads_dir())
        .await
        .unwrap();

    assert_eq!(link.filename, "python-3.13.0-docs-pdf-a4.zip");
    assert_eq!(saved, config.downloads_dir().join(&link.filename));
    assert_eq!(std::fs::read(saved).unwrap(), b"PK\x03\x04pdf");
}

#[tokio::test]
async fn test_cached_rerun_is_identical_and_offline() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));

    let first = run_table(&config, &session, "pep").await;
    let served = server.received_requests().await.unwrap().len();
    let second = run_table(&config, &session, "pep").await;

    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), served);
}

#[tokio::test]
async fn test_results_file_from_pipeline() {
    let server = fake_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));

    let table = run_table(&config, &session, "pep").await;
    let path = write_results_file(&table, "pep", &config.results_dir(), chrono::Local::now())
        .unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("pep_") && name.ends_with(".csv"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "\"status\",\"count\"\n\"Active\",\"1\"\n\"Final\",\"2\"\n\"Total\",\"3\"\n"
    );
}

#[tokio::test]
async fn test_unreachable_index_aborts() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path());
    let session = CachedSession::new(DiskCache::new(config.cache_dir()));
    let registry = PipelineRegistry::with_defaults(&config);

    let err = registry
        .get("whats-new")
        .unwrap()
        .run(&session)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::IndexUnavailable { .. }));
}
