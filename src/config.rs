use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "vitrine.yaml";

#[derive(Deserialize)]
struct Odds(u32);
impl Default for Odds {
    fn default() -> Self {
        Odds(10)
    }
}

#[derive(Deserialize)]
struct Project {
    pub schedule: PathBuf,
    pub templates: PathBuf,
    pub assets: PathBuf,
    pub journal: PathBuf,

    #[serde(default)]
    pub promotion_odds: Odds,

    #[serde(default)]
    pub cause_odds: Odds,

    #[serde(default)]
    pub cause_command: Option<PathBuf>,
}

pub struct Config {
    pub schedule_file: PathBuf,
    pub template_directory: PathBuf,
    pub asset_directory: PathBuf,
    pub journal_file: PathBuf,
    pub output_directory: PathBuf,
    pub promotion_odds: u32,
    pub cause_odds: u32,
    pub cause_command: Option<PathBuf>,
    pub dryrun: bool,
}

impl Config {
    pub fn from_directory(dir: &Path, output_directory: &Path, dryrun: bool) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory, dryrun)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory, dryrun),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
        dryrun: bool,
    ) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                schedule_file: project_root.join(&project.schedule),
                template_directory: project_root.join(&project.templates),
                asset_directory: project_root.join(&project.assets),
                journal_file: project_root.join(&project.journal),
                // A relative command is resolved against the project root,
                // not the working directory.
                cause_command: project
                    .cause_command
                    .map(|command| project_root.join(command)),
                output_directory: output_directory.to_owned(),
                promotion_odds: project.promotion_odds.0,
                cause_odds: project.cause_odds.0,
                dryrun,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const PROJECT: &str = "schedule: schedule.tsv
templates: templates
assets: assets
journal: vitrine.log
cause_command: ./select-cause
";

    #[test]
    fn test_paths_resolve_against_project_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), PROJECT).unwrap();

        let config =
            Config::from_project_file(&dir.path().join(PROJECT_FILE), Path::new("/tmp/out"), false)
                .unwrap();
        assert_eq!(dir.path().join("schedule.tsv"), config.schedule_file);
        assert_eq!(dir.path().join("templates"), config.template_directory);
        assert_eq!(dir.path().join("assets"), config.asset_directory);
        assert_eq!(dir.path().join("vitrine.log"), config.journal_file);
        assert_eq!(
            Some(dir.path().join("./select-cause")),
            config.cause_command
        );
        assert_eq!(Path::new("/tmp/out"), config.output_directory.as_path());
    }

    #[test]
    fn test_odds_default_to_one_in_ten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), PROJECT).unwrap();

        let config =
            Config::from_project_file(&dir.path().join(PROJECT_FILE), Path::new("/tmp/out"), false)
                .unwrap();
        assert_eq!(10, config.promotion_odds);
        assert_eq!(10, config.cause_odds);
    }

    #[test]
    fn test_from_directory_searches_parents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), PROJECT).unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested, Path::new("/tmp/out"), false).unwrap();
        assert_eq!(dir.path().join("schedule.tsv"), config.schedule_file);
    }

    #[test]
    fn test_missing_project_file_is_an_error() {
        assert!(Config::from_directory(Path::new("/"), Path::new("/tmp/out"), false).is_err());
    }
}
