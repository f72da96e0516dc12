use fxmate::AppCommand;
use fxmate::cli::favorites::FavoritesAction;
use fxmate::cli::rates::RatesArgs;
use fxmate::core::settings::UserSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const LATEST_JSON: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "date": "2025-03-14",
        "rates": {"EUR": 0.9197, "JPY": 148.62, "TWD": 32.91, "CNY": 7.24, "KRW": 1452.3}
    }"#;

    pub const PREVIOUS_JSON: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "date": "2025-03-13",
        "rates": {"EUR": 0.9210, "JPY": 147.9, "TWD": 32.95, "CNY": 7.25, "KRW": 1449.0}
    }"#;

    pub const SERIES_JSON: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "rates": {
            "2025-03-12": {"JPY": 148.1},
            "2025-03-10": {"JPY": 147.25}
        }
    }"#;

    pub async fn create_frankfurter_mock() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LATEST_JSON))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2025-03-13"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PREVIOUS_JSON))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SERIES_JSON))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

struct TestApp {
    dir: TempDir,
    config_path: PathBuf,
}

impl TestApp {
    fn new(base_url: &str) -> Self {
        Self::with_extra(base_url, "")
    }

    fn with_extra(base_url: &str, extra: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
providers:
  frankfurter:
    base_url: "{base_url}"
data_path: "{}"
{extra}
"#,
            dir.path().join("data").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        Self { dir, config_path }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    async fn run(&self, command: AppCommand) -> anyhow::Result<()> {
        fxmate::run_command(command, Some(self.config_path.to_str().unwrap())).await
    }
}

fn rates(base: Option<&str>, search: &str) -> AppCommand {
    AppCommand::Rates(RatesArgs {
        base: base.map(str::to_string),
        amount: 100.0,
        from: None,
        search: search.to_string(),
    })
}

#[test_log::test(tokio::test)]
async fn test_rates_flow_with_mock() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let app = TestApp::new(&mock_server.uri());

    let result = app.run(rates(Some("USD"), "")).await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());

    let result = app.run(rates(None, "yen")).await;
    assert!(result.is_ok(), "Search failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_rates_from_other_currency() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let app = TestApp::new(&mock_server.uri());

    let from = |code: &str| {
        AppCommand::Rates(RatesArgs {
            base: Some("USD".to_string()),
            amount: 100.0,
            from: Some(code.to_string()),
            search: String::new(),
        })
    };

    let result = app.run(from("eur")).await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());

    let err = app.run(from("euro")).await.unwrap_err();
    assert!(err.to_string().contains("Invalid currency code: euro"));
}

#[test_log::test(tokio::test)]
async fn test_rates_fails_when_source_is_unavailable() {
    let mock_server = wiremock::MockServer::start().await;
    let app = TestApp::new(&mock_server.uri());

    // Unmatched requests get a 404, which is not retried
    let err = app.run(rates(None, "")).await.unwrap_err();
    info!(error = %err, "Expected failure");
    assert!(err.to_string().contains("Could not load rates"));
}

#[test_log::test(tokio::test)]
async fn test_favorites_persist_between_runs() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let app = TestApp::new(&mock_server.uri());

    app.run(AppCommand::Favorites(FavoritesAction::Add("gbp".to_string())))
        .await
        .unwrap();
    app.run(AppCommand::Favorites(FavoritesAction::Move {
        code: "GBP".to_string(),
        position: 1,
    }))
    .await
    .unwrap();
    app.run(AppCommand::Favorites(FavoritesAction::Remove("KRW".to_string())))
        .await
        .unwrap();

    let store = fxmate::store::disk::DiskSettingsStore::open(&app.path().join("data").join("settings"))
        .unwrap();
    let settings: UserSettings =
        fxmate::core::PreferencesStore::get_settings(&store).await.unwrap();
    assert_eq!(
        settings.favorite_currencies.as_slice(),
        ["GBP", "USD", "TWD", "EUR", "CNY"]
    );
}

#[test_log::test(tokio::test)]
async fn test_base_command_saves_base() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let app = TestApp::new(&mock_server.uri());

    app.run(AppCommand::Base("usd".to_string())).await.unwrap();
    assert!(app.run(AppCommand::Base("not a code".to_string())).await.is_err());

    let store = fxmate::store::disk::DiskSettingsStore::open(&app.path().join("data").join("settings"))
        .unwrap();
    let settings = fxmate::core::PreferencesStore::get_settings(&store).await.unwrap();
    assert_eq!(settings.base_currency, "USD");
}

#[test_log::test(tokio::test)]
async fn test_history_flow_with_mock() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let app = TestApp::new(&mock_server.uri());

    let result = app
        .run(AppCommand::History {
            target: "jpy".to_string(),
            base: Some("USD".to_string()),
            days: Some(7),
        })
        .await;
    assert!(result.is_ok(), "History failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_history_without_data_fails() {
    let mock_server = wiremock::MockServer::start().await;
    let app = TestApp::new(&mock_server.uri());

    let result = app
        .run(AppCommand::History {
            target: "JPY".to_string(),
            base: None,
            days: None,
        })
        .await;
    assert!(result.unwrap_err().to_string().contains("No history available"));
}

#[test_log::test(tokio::test)]
async fn test_sync_pushes_to_shared_dir() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let shared = TempDir::new().unwrap();
    let extra = format!(
        "sync:\n  remote_path: \"{}\"\n  identity: \"alex\"\n",
        shared.path().display()
    );
    let app = TestApp::with_extra(&mock_server.uri(), &extra);

    app.run(AppCommand::Base("EUR".to_string())).await.unwrap();
    app.run(AppCommand::Sync).await.unwrap();

    let pushed: UserSettings =
        serde_json::from_str(&fs::read_to_string(shared.path().join("alex.json")).unwrap())
            .unwrap();
    assert_eq!(pushed.base_currency, "EUR");
}

#[test_log::test(tokio::test)]
async fn test_first_sync_on_new_machine_pulls_shared_copy() {
    let shared = TempDir::new().unwrap();
    let mut existing = UserSettings::starter(1);
    existing.base_currency = "TWD".to_string();
    fs::write(
        shared.path().join("alex.json"),
        serde_json::to_string(&existing).unwrap(),
    )
    .unwrap();

    let extra = format!(
        "sync:\n  remote_path: \"{}\"\n  identity: \"alex\"\n",
        shared.path().display()
    );
    let app = TestApp::with_extra("http://127.0.0.1:9", &extra);

    app.run(AppCommand::Sync).await.unwrap();

    let store = fxmate::store::disk::DiskSettingsStore::open(&app.path().join("data").join("settings"))
        .unwrap();
    let settings = fxmate::core::PreferencesStore::get_settings(&store).await.unwrap();
    assert_eq!(settings, existing);
}

#[test_log::test(tokio::test)]
async fn test_sync_requires_config() {
    let app = TestApp::new("http://127.0.0.1:9");

    let err = app.run(AppCommand::Sync).await.unwrap_err();
    assert!(err.to_string().contains("Sync is not configured"));
}
