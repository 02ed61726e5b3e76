use roost_config::{default_config, read_config, ConfigFormat};

use super::*;

fn context_in(dir: &tempfile::TempDir) -> CommandContext {
    CommandContext {
        cwd: dir.path().to_path_buf(),
    }
}

#[tokio::test]
async fn test_init_writes_a_fresh_config() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(&dir);

    init::execute(
        Some("wren".to_string()),
        Some("tiny test module".to_string()),
        "mod.ts".to_string(),
        ConfigFormat::Json,
        false,
        &ctx,
    )
    .await
    .unwrap();

    let path = default_config(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("roost.json"));

    let config = read_config(&path).await.unwrap();
    assert_eq!(config.name.as_deref(), Some("wren"));
    assert_eq!(config.entry.as_deref(), Some("mod.ts"));
}

#[tokio::test]
async fn test_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(&dir);
    std::fs::write(dir.path().join("roost.json"), "{}").unwrap();

    let result = init::execute(
        None,
        None,
        "mod.ts".to_string(),
        ConfigFormat::Json,
        false,
        &ctx,
    )
    .await;
    assert!(result.is_err());

    // with --force the existing file is replaced
    init::execute(
        Some("wren".to_string()),
        None,
        "mod.ts".to_string(),
        ConfigFormat::Yaml,
        true,
        &ctx,
    )
    .await
    .unwrap();
    assert!(dir.path().join("roost.yml").exists());
}

#[tokio::test]
async fn test_init_defaults_the_name_to_the_directory() {
    let parent = tempfile::tempdir().unwrap();
    let project = parent.path().join("nestling");
    std::fs::create_dir(&project).unwrap();
    let ctx = CommandContext { cwd: project.clone() };

    init::execute(
        None,
        None,
        "mod.ts".to_string(),
        ConfigFormat::Json,
        false,
        &ctx,
    )
    .await
    .unwrap();

    let config = read_config(&project.join("roost.json")).await.unwrap();
    assert_eq!(config.name.as_deref(), Some("nestling"));
}
