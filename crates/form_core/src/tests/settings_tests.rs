use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn trailing_slash_is_trimmed_from_api_url() {
    assert_eq!(
        normalize_api_url("https://forms.example.com/api/").expect("url"),
        "https://forms.example.com/api"
    );
}

#[test]
fn missing_api_url_is_an_error() {
    let settings = ClientSettings::default();
    assert_eq!(settings.api_url(), Err(SettingsError::MissingApiUrl));
    assert_eq!(normalize_api_url("   "), Err(SettingsError::MissingApiUrl));
}

#[test]
fn non_http_scheme_is_rejected() {
    assert_eq!(
        normalize_api_url("ftp://forms.example.com"),
        Err(SettingsError::UnsupportedScheme("ftp".to_string()))
    );
}

#[test]
fn base_url_with_query_or_fragment_is_rejected() {
    for raw in ["http://forms.example.com/api?x=1", "http://forms.example.com/api#top"] {
        assert!(
            matches!(
                normalize_api_url(raw),
                Err(SettingsError::InvalidApiUrl { .. })
            ),
            "{raw} accepted"
        );
    }
}

#[test]
fn garbage_url_is_rejected() {
    assert!(matches!(
        normalize_api_url("not a url"),
        Err(SettingsError::InvalidApiUrl { .. })
    ));
}

#[test]
fn env_overrides_file() {
    let mut settings = ClientSettings::default();
    settings.apply_file(
        r#"
api_url = "http://file.example.com"
request_timeout_seconds = 10
"#,
    );
    settings
        .apply_env(env_from(&[
            ("HAZARD_API_URL", "http://env.example.com"),
            ("APP__REQUEST_TIMEOUT_SECONDS", "30"),
        ]))
        .expect("env");

    assert_eq!(settings.api_url().expect("url"), "http://env.example.com");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn app_prefixed_env_wins_over_plain_name() {
    let mut settings = ClientSettings::default();
    settings
        .apply_env(env_from(&[
            ("HAZARD_API_URL", "http://plain.example.com"),
            ("APP__API_URL", "http://app.example.com"),
        ]))
        .expect("env");
    assert_eq!(settings.api_url().expect("url"), "http://app.example.com");
}

#[test]
fn invalid_timeout_env_is_an_error() {
    let mut settings = ClientSettings::default();
    let err = settings
        .apply_env(env_from(&[("APP__REQUEST_TIMEOUT_SECONDS", "soon")]))
        .expect_err("invalid");
    assert_eq!(err, SettingsError::InvalidTimeout("soon".to_string()));
}

#[test]
fn zero_timeout_means_transport_default() {
    let settings = ClientSettings {
        request_timeout_seconds: Some(0),
        ..ClientSettings::default()
    };
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn unparsable_file_is_ignored() {
    let mut settings = ClientSettings::default();
    settings.apply_file("api_url = [");
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn catalog_defaults_to_site_catalog() {
    let catalog = ClientSettings::default().load_catalog().expect("catalog");
    assert_eq!(catalog, HazardCatalog::site_default());
}

#[test]
fn catalog_is_loaded_from_configured_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("hazard_form_catalog_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("catalog.toml");
    fs::write(
        &path,
        r#"
ppe = ["Hard Hat"]

[[hazards]]
name = "Confined Space"
controls = ["Entry Permit", "Attendant"]
"#,
    )
    .expect("write catalog");

    let settings = ClientSettings {
        catalog_path: Some(path),
        ..ClientSettings::default()
    };
    let catalog = settings.load_catalog().expect("catalog");
    assert!(catalog.allows_control("Confined Space", "Attendant"));
    assert!(!catalog.is_hazard("Electrical"));

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_catalog_file_reports_path() {
    let settings = ClientSettings {
        catalog_path: Some(PathBuf::from("/nonexistent/hazard-catalog.toml")),
        ..ClientSettings::default()
    };
    let err = settings.load_catalog().expect_err("missing");
    assert!(err.to_string().contains("hazard-catalog.toml"));
}
