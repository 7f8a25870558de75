//! End-to-end builds against a mock GitHub API and file server

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use provisioner::{
    BuildError, BuildOptions, DownloadConfig, PluginError, PluginRegistry, Provisioner,
};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};
use zip::write::SimpleFileOptions;

struct Workspace {
    _temp_dir: TempDir,
    base: PathBuf,
    dl: PathBuf,
    sd: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = tempdir().unwrap();
        let base = temp_dir.path().to_path_buf();
        Self {
            dl: base.join("dl"),
            sd: base.join("sd"),
            base,
            _temp_dir: temp_dir,
        }
    }

    /// Write the manifest with the workspace's root directories merged in
    fn write_manifest(&self, segments: Value) {
        let mut manifest = serde_json::Map::new();
        manifest.insert("root".to_string(), json!({"dl": self.dl, "sd": self.sd, "description": "Test"}));
        if let Value::Object(entries) = segments {
            manifest.extend(entries);
        }

        let dir = self.base.join("cfg/sd/emummc");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stock.json"), Value::Object(manifest).to_string()).unwrap();
    }

    fn options(&self, server: &MockServer) -> BuildOptions {
        BuildOptions::default()
            .with_base_dir(&self.base)
            .with_download_config(DownloadConfig::default().with_github_api_base(server.uri()))
            .quiet(true)
    }

    async fn provisioner(&self, server: &MockServer) -> Provisioner {
        Provisioner::load(&self.options(server), "emummc", "stock").await.unwrap()
    }
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

async fn mount_file(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

async fn mount_release(server: &MockServer, repo: &str, assets: &[&str]) {
    let assets: Vec<Value> = assets
        .iter()
        .map(|name| json!({"name": name, "browser_download_url": format!("{}/assets/{}", server.uri(), name)}))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v1", "assets": assets})))
        .mount(server)
        .await;
}

/// Every file below `root` with its content, keyed by relative path
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                files.insert(path.strip_prefix(root).unwrap().to_path_buf(), std::fs::read(&path).unwrap());
            }
        }
    }

    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

#[tokio::test]
async fn test_url_component_downloads_then_copies() {
    let server = MockServer::start().await;
    mount_file(&server, "/f.bin", b"payload".to_vec()).await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg1": {"component": [{"name": "x", "url": format!("{}/f.bin", server.uri())}]}
    }));

    let summary = ws.provisioner(&server).await.build().await.unwrap();

    assert_eq!(std::fs::read(ws.dl.join("f.bin")).unwrap(), b"payload");
    assert_eq!(std::fs::read(ws.sd.join("f.bin")).unwrap(), b"payload");
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.installed, 1);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_empty_url_component_downloads_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({"seg": {"component": [{"name": "x", "url": ""}]}}));

    let mut provisioner = ws.provisioner(&server).await;
    let summary = provisioner.build().await.unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.failed, 0);
    assert!(provisioner.segments()[0].components[0].downloaded().is_empty());
    assert!(snapshot(&ws.dl).is_empty());
}

#[tokio::test]
async fn test_github_release_zip_is_extracted_into_segment_dir() {
    let server = MockServer::start().await;
    mount_release(&server, "CTCaer/hekate", &["hekate_ctcaer_6.0.zip", "nyx_usb.txt"]).await;
    mount_file(
        &server,
        "/assets/hekate_ctcaer_6.0.zip",
        zip_bytes(&[("bootloader/update.bin", b"hekate"), ("hekate_ctcaer_6.0.bin", b"payload")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/assets/nyx_usb.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "hekate": {
            "dl": "hekate",
            "sd": "boot",
            "component": [{"name": "hekate", "github": {"repo": "CTCaer/hekate", "regex": ["hekate_ctcaer_.*\\.zip"]}}]
        }
    }));

    let summary = ws.provisioner(&server).await.build().await.unwrap();

    assert!(ws.dl.join("hekate/hekate_ctcaer_6.0.zip").is_file());
    assert_eq!(std::fs::read(ws.sd.join("boot/bootloader/update.bin")).unwrap(), b"hekate");
    assert!(ws.sd.join("boot/hekate_ctcaer_6.0.bin").is_file());
    assert_eq!(summary.installed, 1);
}

#[tokio::test]
async fn test_github_is_used_when_url_is_also_set() {
    let server = MockServer::start().await;
    mount_release(&server, "o/r", &["tool.nro"]).await;
    mount_file(&server, "/assets/tool.nro", b"nro".to_vec()).await;
    Mock::given(method("GET"))
        .and(path("/direct.bin"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [{
            "name": "tool",
            "github": {"repo": "o/r", "regex": ["tool"]},
            "url": format!("{}/direct.bin", server.uri())
        }]}
    }));

    ws.provisioner(&server).await.build().await.unwrap();

    assert!(ws.sd.join("tool.nro").is_file());
    assert!(!ws.dl.join("direct.bin").exists());
}

#[tokio::test]
async fn test_asset_matching_two_patterns_is_downloaded_twice() {
    let server = MockServer::start().await;
    mount_release(&server, "o/r", &["sigpatches.zip"]).await;
    Mock::given(method("GET"))
        .and(path("/assets/sigpatches.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[("atmosphere/x", b"1")])))
        .expect(2)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [{
            "name": "sigpatches",
            "github": {"repo": "o/r", "regex": ["sig"]},
            "regex": [".*\\.zip"]
        }]}
    }));

    let summary = ws.provisioner(&server).await.build().await.unwrap();

    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.installed, 2);
}

#[tokio::test]
async fn test_disabled_component_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [
            {"name": "a", "github": {"repo": "o/r", "regex": [".*"]}, "isDisabled": true},
            {"name": "b", "url": format!("{}/b.bin", server.uri()), "isDisabled": true}
        ]}
    }));

    let mut provisioner = ws.provisioner(&server).await;
    let summary = provisioner.build().await.unwrap();

    assert_eq!(summary.downloaded, 0);
    assert!(provisioner.segments()[0].components.iter().all(|c| c.downloaded().is_empty()));
    assert!(snapshot(&ws.sd).is_empty());
}

#[tokio::test]
async fn test_unknown_file_type_is_downloaded_but_not_installed() {
    let server = MockServer::start().await;
    mount_file(&server, "/release.7z", b"7z".to_vec()).await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [{"name": "x", "url": format!("{}/release.7z", server.uri())}]}
    }));

    let summary = ws.provisioner(&server).await.build().await.unwrap();

    assert!(ws.dl.join("release.7z").is_file());
    assert!(snapshot(&ws.sd).is_empty());
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.installed, 0);
}

#[tokio::test]
async fn test_failed_download_is_reported_and_build_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_file(&server, "/ok.bin", b"ok".to_vec()).await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [
            {"name": "missing", "url": format!("{}/missing.bin", server.uri())},
            {"name": "ok", "url": format!("{}/ok.bin", server.uri())}
        ]}
    }));

    let mut provisioner = ws.provisioner(&server).await;
    let summary = provisioner.build().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.downloaded, 1);
    assert!(provisioner.segments()[0].components[0].downloaded().is_empty());
    assert!(!ws.sd.join("missing.bin").exists());
    assert!(ws.sd.join("ok.bin").is_file());
}

#[tokio::test]
async fn test_github_error_yields_no_assets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/releases/latest"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {"component": [{"name": "x", "github": {"repo": "o/r", "regex": [".*"]}}]}
    }));

    let summary = ws.provisioner(&server).await.build().await.unwrap();

    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.errors.len(), 1);
}

#[tokio::test]
async fn test_building_twice_gives_identical_tree() {
    let server = MockServer::start().await;
    mount_file(&server, "/payload.bin", b"payload".to_vec()).await;
    mount_file(&server, "/pack.zip", zip_bytes(&[("switch/app.nro", b"nro")])).await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {
            "sd": "atmosphere",
            "component": [
                {"name": "payload", "url": format!("{}/payload.bin", server.uri())},
                {"name": "pack", "url": format!("{}/pack.zip", server.uri())}
            ],
            "ini": [{"path": "exosphere.ini", "line": ["[exosphere]", "debugmode=1"]}]
        }
    }));

    let mut provisioner = ws.provisioner(&server).await;
    provisioner.build().await.unwrap();
    let first = snapshot(&ws.sd);
    provisioner.build().await.unwrap();
    let second = snapshot(&ws.sd);

    assert_eq!(first, second);
    assert_eq!(first.get(Path::new("exosphere.ini")).unwrap(), b"[exosphere]\ndebugmode=1");
    assert!(first.contains_key(Path::new("atmosphere/switch/app.nro")));
}

#[tokio::test]
async fn test_external_failure_aborts_remaining_segments() {
    let server = MockServer::start().await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "first": {"external": [{"function": "patch", "args": {"level": 2}}]},
        "second": {"ini": [{"path": "late.ini", "line": ["x"]}]}
    }));

    let registry = PluginRegistry::without_scripts()
        .register_fn("patch", |_ctx, _args| Err(PluginError::Plugin("patch failed".to_string())));
    let mut provisioner = ws.provisioner(&server).await.with_registry(registry);

    let err = provisioner.build().await.unwrap_err();

    assert!(matches!(err, BuildError::External { ref function, .. } if function == "patch"));
    assert!(!ws.sd.join("late.ini").exists());
}

#[tokio::test]
async fn test_external_plugin_runs_after_components() {
    let server = MockServer::start().await;
    mount_file(&server, "/f.bin", b"payload".to_vec()).await;

    let ws = Workspace::new();
    ws.write_manifest(json!({
        "seg": {
            "component": [{"name": "x", "url": format!("{}/f.bin", server.uri())}],
            "external": [{"function": {"name": "check", "description": "Check payload"}, "args": ["f.bin"]}]
        }
    }));

    let registry = PluginRegistry::without_scripts().register_fn("check", |ctx, args| {
        let name = args[0].as_str().unwrap_or_default();
        if ctx.install_dir.join(name).is_file() {
            Ok(())
        } else {
            Err(PluginError::Plugin(format!("{} not installed", name)))
        }
    });
    let mut provisioner = ws.provisioner(&server).await.with_registry(registry);

    let summary = provisioner.build().await.unwrap();
    assert_eq!(summary.plugins_run, 1);
}

#[tokio::test]
async fn test_missing_manifest_fails_to_load() {
    let server = MockServer::start().await;
    let ws = Workspace::new();

    let result = Provisioner::load(&ws.options(&server), "emummc", "absent").await;

    assert!(matches!(result, Err(BuildError::Manifest(_))));
}
