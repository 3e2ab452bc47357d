fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=secrets.local.rs");
    emit_local_secrets();

    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}

/// Export the constants of an optional, git-ignored `secrets.local.rs` as
/// `LOCAL_*` compile-time environment variables for `config.rs`.
fn emit_local_secrets() {
    let path = std::path::Path::new("secrets.local.rs");
    let Ok(src) = std::fs::read_to_string(path) else {
        return;
    };

    for (name, var) in [
        ("WIFI_SSID", "LOCAL_WIFI_SSID"),
        ("WIFI_PASS", "LOCAL_WIFI_PASS"),
        ("PIRATE_WEATHER_API_KEY", "LOCAL_PIRATE_WEATHER_API_KEY"),
        ("LATITUDE", "LOCAL_LATITUDE"),
        ("LONGITUDE", "LOCAL_LONGITUDE"),
    ] {
        if let Some(v) = extract_const_value(&src, name) {
            println!("cargo:rustc-env={}={}", var, v);
        }
    }
}

/// Pull the literal out of `pub const NAME: T = <literal>;`. Quotes around
/// string literals are stripped; numeric literals are returned as written.
fn extract_const_value(src: &str, name: &str) -> Option<String> {
    let needle = format!("pub const {}:", name);
    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("//") || !trimmed.starts_with(&needle) {
            continue;
        }
        let value = trimmed.split_once('=')?.1.trim().trim_end_matches(';').trim();
        if let Some(quoted) = value.strip_prefix('"') {
            let end = quoted.find('"')?;
            return Some(quoted[..end].to_string());
        }
        return Some(value.to_string());
    }
    None
}
