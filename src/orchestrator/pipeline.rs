use super::{
    clean_paths, CleanOutcome, Invocation, OrchestratorError, Plan, ProcessRunner, Step,
    StepOutcome,
};
use crate::cli_utils::progress;
use crate::config::SeedFailurePolicy;

/// What happened during a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub cleaned: Vec<CleanOutcome>,
    /// `None` when seeding was skipped or could not start
    pub seed: Option<StepOutcome>,
    pub server: StepOutcome,
}

/// Runs a [`Plan`] through a [`ProcessRunner`]
pub struct Orchestrator<R: ProcessRunner> {
    plan: Plan,
    runner: R,
}

impl<R: ProcessRunner> Orchestrator<R> {
    pub fn new(plan: Plan, runner: R) -> Result<Self, OrchestratorError> {
        plan.check()?;
        Ok(Self { plan, runner })
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Remove the configured cache paths. Never fails.
    pub fn clean(&mut self) -> Vec<CleanOutcome> {
        let Some(entries) = &self.plan.clean else {
            tracing::debug!(step = %Step::Clean, "skipped");
            return Vec::new();
        };

        progress("Cleaning Python bytecode caches...");
        clean_paths(&self.plan.root, entries)
    }

    /// Run the seed program once. The failure policy is applied by [`run`](Self::run).
    pub fn seed(&mut self) -> Result<Option<StepOutcome>, OrchestratorError> {
        let Some(invocation) = &self.plan.seed else {
            tracing::debug!(step = %Step::Seed, "skipped");
            return Ok(None);
        };

        progress(&format!("Seeding database ({})...", invocation.command_line()));
        spawn(&mut self.runner, invocation).map(Some)
    }

    /// Start the development server and block until it exits
    pub fn serve(&mut self) -> Result<StepOutcome, OrchestratorError> {
        progress(&format!(
            "Starting development server ({})...",
            self.plan.server.command_line()
        ));
        spawn(&mut self.runner, &self.plan.server)
    }

    /// Clean, seed, then serve
    pub fn run(&mut self) -> Result<RunReport, OrchestratorError> {
        let cleaned = self.clean();
        let policy = self.plan.on_seed_failure;

        let seed = match self.seed() {
            Ok(Some(outcome)) if !outcome.success() => match policy {
                SeedFailurePolicy::Abort => {
                    return Err(OrchestratorError::SeedFailed {
                        code: outcome.exit_code,
                    })
                }
                SeedFailurePolicy::Continue => {
                    tracing::warn!(
                        step = %Step::Seed,
                        exit_code = outcome.exit_code,
                        "seed failed, starting the server anyway"
                    );
                    Some(outcome)
                }
            },
            Ok(outcome) => outcome,
            Err(e) => match policy {
                SeedFailurePolicy::Abort => return Err(e),
                SeedFailurePolicy::Continue => {
                    tracing::warn!(step = %Step::Seed, "{:#}, starting the server anyway", e);
                    None
                }
            },
        };

        let server = self.serve()?;

        Ok(RunReport {
            cleaned,
            seed,
            server,
        })
    }
}

fn spawn<R: ProcessRunner>(
    runner: &mut R,
    invocation: &Invocation,
) -> Result<StepOutcome, OrchestratorError> {
    runner
        .run(invocation)
        .map_err(|source| OrchestratorError::Spawn {
            step: invocation.step,
            program: invocation.program.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records invocations; exit codes are scripted per step
    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<Invocation>,
        exit_codes: HashMap<Step, i32>,
        missing: Vec<Step>,
        /// Whether each cache dir still existed when a program was spawned
        caches_seen: Vec<bool>,
        watch: Option<PathBuf>,
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&mut self, invocation: &Invocation) -> std::io::Result<StepOutcome> {
            self.calls.push(invocation.clone());
            if let Some(dir) = &self.watch {
                self.caches_seen.push(dir.exists());
            }
            if self.missing.contains(&invocation.step) {
                return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
            }
            Ok(StepOutcome {
                exit_code: self.exit_codes.get(&invocation.step).copied().unwrap_or(0),
                duration: Duration::from_millis(1),
            })
        }
    }

    impl RecordingRunner {
        fn steps(&self) -> Vec<Step> {
            self.calls.iter().map(|c| c.step).collect()
        }
    }

    fn invocation(root: &Path, step: Step, program: &str, args: &[&str]) -> Invocation {
        Invocation {
            step,
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: BTreeMap::new(),
            cwd: root.to_path_buf(),
        }
    }

    fn plan(root: &Path, policy: SeedFailurePolicy) -> Plan {
        Plan {
            root: root.to_path_buf(),
            clean: Some(vec!["Onboarding/__pycache".into(), "__pycache__".into()]),
            seed: Some(invocation(root, Step::Seed, "python", &["seed.py"])),
            server: invocation(root, Step::Serve, "flask", &["--app", "app", "run", "--debug"]),
            on_seed_failure: policy,
        }
    }

    fn populate(root: &Path) {
        for dir in ["Onboarding/__pycache", "__pycache__"] {
            let path = root.join(dir);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("module.pyc"), b"\x00\x01").unwrap();
        }
    }

    #[test]
    fn test_full_run_cleans_then_seeds_then_serves() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let runner = RecordingRunner {
            watch: Some(temp.path().join("__pycache__")),
            ..Default::default()
        };
        let mut orchestrator =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Abort), runner).unwrap();

        let report = orchestrator.run().unwrap();

        assert!(!temp.path().join("Onboarding/__pycache").exists());
        assert!(!temp.path().join("__pycache__").exists());
        assert_eq!(report.cleaned.len(), 2);

        let runner = orchestrator.runner();
        assert_eq!(runner.steps(), vec![Step::Seed, Step::Serve]);
        assert_eq!(runner.caches_seen, vec![false, false]);
        assert_eq!(runner.calls[0].program, "python");
        assert_eq!(runner.calls[0].args, vec!["seed.py"]);
        assert_eq!(runner.calls[1].program, "flask");
        assert_eq!(runner.calls[1].args.last().map(String::as_str), Some("--debug"));
        assert!(report.seed.unwrap().success());
        assert!(report.server.success());
    }

    #[test]
    fn test_absent_caches_still_seed_and_serve() {
        let temp = TempDir::new().unwrap();
        let mut orchestrator = Orchestrator::new(
            plan(temp.path(), SeedFailurePolicy::Abort),
            RecordingRunner::default(),
        )
        .unwrap();

        let report = orchestrator.run().unwrap();

        assert!(report
            .cleaned
            .iter()
            .all(|o| matches!(o, CleanOutcome::Absent { .. })));
        assert_eq!(orchestrator.runner().steps(), vec![Step::Seed, Step::Serve]);
    }

    #[test]
    fn test_cleanup_failure_does_not_stop_the_run() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let mut plan = plan(temp.path(), SeedFailurePolicy::Abort);
        plan.clean = Some(vec!["[".into(), "__pycache__".into()]);

        let mut orchestrator = Orchestrator::new(plan, RecordingRunner::default()).unwrap();
        let report = orchestrator.run().unwrap();

        assert!(matches!(report.cleaned[0], CleanOutcome::Failed { .. }));
        assert!(matches!(report.cleaned[1], CleanOutcome::Removed { .. }));
        assert_eq!(orchestrator.runner().steps(), vec![Step::Seed, Step::Serve]);
        assert!(report.server.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_outside_root_is_skipped_and_run_continues() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let outside = temp.path().join("shared");
        fs::create_dir_all(outside.join("__pycache")).unwrap();
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("Onboarding")).unwrap();

        let mut orchestrator =
            Orchestrator::new(plan(&root, SeedFailurePolicy::Abort), RecordingRunner::default())
                .unwrap();
        let report = orchestrator.run().unwrap();

        assert!(outside.join("__pycache").exists());
        assert!(report.cleaned.iter().any(CleanOutcome::is_failure));
        assert_eq!(orchestrator.runner().steps(), vec![Step::Seed, Step::Serve]);
    }

    #[test]
    fn test_failing_seed_aborts_by_default() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner {
            exit_codes: HashMap::from([(Step::Seed, 2)]),
            ..Default::default()
        };
        let mut orchestrator =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Abort), runner).unwrap();

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, OrchestratorError::SeedFailed { code: 2 }));
        assert_eq!(orchestrator.runner().steps(), vec![Step::Seed]);
    }

    #[test]
    fn test_failing_seed_continues_when_configured() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner {
            exit_codes: HashMap::from([(Step::Seed, 1)]),
            ..Default::default()
        };
        let mut orchestrator =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Continue), runner).unwrap();

        let report = orchestrator.run().unwrap();

        assert_eq!(orchestrator.runner().steps(), vec![Step::Seed, Step::Serve]);
        assert_eq!(report.seed.unwrap().exit_code, 1);
    }

    #[test]
    fn test_missing_seed_program_respects_policy() {
        let temp = TempDir::new().unwrap();

        let runner = RecordingRunner {
            missing: vec![Step::Seed],
            ..Default::default()
        };
        let mut abort =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Abort), runner).unwrap();
        assert!(matches!(
            abort.run(),
            Err(OrchestratorError::Spawn {
                step: Step::Seed,
                ..
            })
        ));

        let runner = RecordingRunner {
            missing: vec![Step::Seed],
            ..Default::default()
        };
        let mut keep_going =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Continue), runner).unwrap();
        let report = keep_going.run().unwrap();
        assert!(report.seed.is_none());
        assert_eq!(keep_going.runner().steps(), vec![Step::Seed, Step::Serve]);
    }

    #[test]
    fn test_missing_server_program_is_an_error() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner {
            missing: vec![Step::Serve],
            ..Default::default()
        };
        let mut orchestrator =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Continue), runner).unwrap();

        let err = orchestrator.run().unwrap_err();
        assert!(err.to_string().contains("serve program: flask"));
    }

    #[test]
    fn test_server_exit_code_is_reported() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner {
            exit_codes: HashMap::from([(Step::Serve, 130)]),
            ..Default::default()
        };
        let mut orchestrator =
            Orchestrator::new(plan(temp.path(), SeedFailurePolicy::Abort), runner).unwrap();

        assert_eq!(orchestrator.run().unwrap().server.exit_code, 130);
    }

    #[test]
    fn test_skipped_steps() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let mut plan = plan(temp.path(), SeedFailurePolicy::Abort);
        plan.clean = None;
        plan.seed = None;

        let mut orchestrator = Orchestrator::new(plan, RecordingRunner::default()).unwrap();
        let report = orchestrator.run().unwrap();

        assert!(report.cleaned.is_empty());
        assert!(report.seed.is_none());
        assert!(temp.path().join("__pycache__").exists());
        assert_eq!(orchestrator.runner().steps(), vec![Step::Serve]);
    }

    #[test]
    fn test_invalid_plan_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut plan = plan(temp.path(), SeedFailurePolicy::Abort);
        plan.server.step = Step::Seed;

        assert!(Orchestrator::new(plan, RecordingRunner::default()).is_err());
    }
}
