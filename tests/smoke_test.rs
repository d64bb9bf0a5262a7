use async_trait::async_trait;
use repodoc::prompt::DEFAULT_TEMPLATE;
use repodoc::{
    Config, DiscoveryOptions, DocgenError, GenerationAgent, LocatedSource, Mode, Result,
    document_project, generate_documentation, run_repodoc, run_until_interrupted,
};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

/// Records every prompt and answers with a fixed document.
#[derive(Default)]
struct RecordingAgent {
    prompts: Mutex<Vec<String>>,
}

impl RecordingAgent {
    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationAgent for RecordingAgent {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("# Generated".to_string())
    }
}

struct FailingAgent;

#[async_trait]
impl GenerationAgent for FailingAgent {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(DocgenError::generation("provider unavailable"))
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn generate_config(input: &Path) -> Config {
    Config {
        mode: Mode::Generate {
            input: input.to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn it_summarizes_files_in_order() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write(root, "a.py", "\"\"\"A\"\"\"\n\ndef f():\n    \"\"\"F\"\"\"\n");
    write(root, "b.py", "class C:\n    \"\"\"B\"\"\"\n");

    let agent = RecordingAgent::default();
    let markdown = document_project(root, &DiscoveryOptions::default(), DEFAULT_TEMPLATE, &agent)
        .await?;
    assert_eq!(markdown, "# Generated");

    let prompt = agent.last_prompt();
    assert!(prompt.contains("Project Structure:\na.py, b.py\n"));

    let a_block = prompt.find("File: a.py").unwrap();
    let b_block = prompt.find("File: b.py").unwrap();
    assert!(a_block < b_block);
    assert!(prompt[a_block..b_block].contains("Module Docstring: A\n"));
    assert!(prompt[a_block..b_block].contains("Functions: f (F)\n"));
    assert!(prompt[b_block..].contains("Classes: C (B)\n"));
    assert!(prompt.contains(DEFAULT_TEMPLATE));

    Ok(())
}

#[tokio::test]
async fn it_skips_invalid_files_and_keeps_going() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write(root, "broken.py", "def oops(:\n");
    write(root, "fine.py", "def ok():\n    \"\"\"Works.\"\"\"\n");

    let agent = RecordingAgent::default();
    document_project(root, &DiscoveryOptions::default(), DEFAULT_TEMPLATE, &agent).await?;

    let prompt = agent.last_prompt();
    assert!(prompt.contains("Functions: ok (Works.)"));
    assert!(!prompt.contains("broken.py"));

    Ok(())
}

#[tokio::test]
async fn it_still_calls_the_agent_for_empty_projects() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "README.md", "# Not Python\n");

    let agent = RecordingAgent::default();
    document_project(
        temp_dir.path(),
        &DiscoveryOptions::default(),
        "## Only Section",
        &agent,
    )
    .await?;

    assert_eq!(agent.calls(), 1);
    let prompt = agent.last_prompt();
    assert!(prompt.contains("Project Structure:\n\n"));
    assert!(prompt.contains("Documentation Template:\n## Only Section\n"));

    Ok(())
}

#[tokio::test]
async fn it_respects_the_depth_bound() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write(root, "top.py", "x = 1\n");
    write(root, "one/two/deep.py", "x = 1\n");

    let options = DiscoveryOptions {
        max_depth: 2,
        ..DiscoveryOptions::default()
    };
    let agent = RecordingAgent::default();
    document_project(root, &options, DEFAULT_TEMPLATE, &agent).await?;

    let prompt = agent.last_prompt();
    assert!(prompt.contains("top.py"));
    assert!(!prompt.contains("deep.py"));

    Ok(())
}

#[tokio::test]
async fn it_surfaces_generation_failures() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "m.py", "\"\"\"M\"\"\"\n");

    let config = generate_config(temp_dir.path());
    let err = run_repodoc(&config, &FailingAgent).await.unwrap_err();

    assert!(matches!(err, DocgenError::Generation { .. }));
    assert!(!err.user_message().contains("provider unavailable"));
    Ok(())
}

#[tokio::test]
async fn it_rejects_missing_local_paths() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let config = generate_config(&temp_dir.path().join("missing"));

    let agent = RecordingAgent::default();
    let err = run_repodoc(&config, &agent).await.unwrap_err();

    assert!(matches!(err, DocgenError::InvalidPath { .. }));
    assert_eq!(agent.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn it_leaves_local_sources_in_place() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "m.py", "x = 1\n");

    let agent = RecordingAgent::default();
    generate_documentation(
        LocatedSource::local(temp_dir.path()),
        &DiscoveryOptions::default(),
        DEFAULT_TEMPLATE,
        &agent,
    )
    .await?;

    assert!(temp_dir.path().join("m.py").exists());
    Ok(())
}

#[tokio::test]
async fn it_grades_in_dry_run_without_an_agent_call() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let original = temp_dir.path().join("original.md");
    let generated = temp_dir.path().join("generated.md");
    fs::write(&original, "# Original docs")?;
    fs::write(&generated, "# Generated docs")?;

    let config = Config {
        mode: Mode::Grade {
            original,
            generated,
        },
        dry_run: true,
        ..Config::default()
    };
    let agent = RecordingAgent::default();
    let prompt = run_repodoc(&config, &agent).await?;

    assert!(prompt.contains("# Original docs"));
    assert!(prompt.contains("# Generated docs"));
    assert_eq!(agent.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn it_prefers_a_pending_interrupt_over_finished_work() {
    let outcome = run_until_interrupted(async { "done" }, async {}).await;
    assert_eq!(outcome, None);
}

#[tokio::test]
async fn it_returns_the_outcome_when_not_interrupted() {
    let outcome = run_until_interrupted(async { "done" }, std::future::pending()).await;
    assert_eq!(outcome, Some("done"));
}

#[cfg(feature = "git")]
mod remote_workspace {
    use super::*;
    use git2::{Repository, Signature};
    use repodoc::git::{CloneOptions, ScopedWorkspace};

    #[tokio::test]
    async fn it_removes_the_workspace_after_success() -> anyhow::Result<()> {
        let workspace = ScopedWorkspace::new()?;
        let path = workspace.path().to_path_buf();
        write(&path, "pkg/mod.py", "\"\"\"Cloned.\"\"\"\n");

        let agent = RecordingAgent::default();
        generate_documentation(
            LocatedSource::remote(workspace),
            &DiscoveryOptions::default(),
            DEFAULT_TEMPLATE,
            &agent,
        )
        .await?;

        assert!(agent.last_prompt().contains("File: pkg/mod.py"));
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn it_removes_the_workspace_after_generation_failure() -> anyhow::Result<()> {
        let workspace = ScopedWorkspace::new()?;
        let path = workspace.path().to_path_buf();
        write(&path, "mod.py", "x = 1\n");

        let result = generate_documentation(
            LocatedSource::remote(workspace),
            &DiscoveryOptions::default(),
            DEFAULT_TEMPLATE,
            &FailingAgent,
        )
        .await;

        assert!(result.is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn it_removes_the_workspace_when_interrupted() -> anyhow::Result<()> {
        let workspace = ScopedWorkspace::new()?;
        let path = workspace.path().to_path_buf();
        write(&path, "mod.py", "x = 1\n");

        let options = DiscoveryOptions::default();
        let agent = RecordingAgent::default();
        let work = generate_documentation(
            LocatedSource::remote(workspace),
            &options,
            DEFAULT_TEMPLATE,
            &agent,
        );
        let outcome = run_until_interrupted(work, async {}).await;

        assert!(outcome.is_none());
        assert_eq!(agent.calls(), 0);
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn it_documents_a_cloned_repository() -> anyhow::Result<()> {
        let origin = tempdir()?;
        write(origin.path(), "lib.py", "\"\"\"Library.\"\"\"\n");
        let repo = Repository::init(origin.path())?;
        let mut index = repo.index()?;
        index.add_path(Path::new("lib.py"))?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let sig = Signature::now("fixture", "fixture@example.com")?;
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])?;

        let workspace = ScopedWorkspace::new()?;
        let path = workspace.path().to_path_buf();
        let url = format!("file://{}", origin.path().display());
        workspace.clone_repository(
            &url,
            &CloneOptions {
                branch: None,
                depth: None,
            },
        )?;

        let agent = RecordingAgent::default();
        generate_documentation(
            LocatedSource::remote(workspace),
            &DiscoveryOptions::default(),
            DEFAULT_TEMPLATE,
            &agent,
        )
        .await?;

        let prompt = agent.last_prompt();
        assert!(prompt.contains("File: lib.py\nModule Docstring: Library.\n"));
        assert!(!prompt.contains(".git"));
        assert!(!path.exists());
        Ok(())
    }
}
