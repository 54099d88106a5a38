use layout_compare::{
    Dispatch, Error, HarnessConfig, Invocation, Orchestrator, Phase, ProcessHost,
    RendererConfig, RendererKind, RunStatus, ViewerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Pretends to be the renderers and viewers: writes a small SVG for every successful
/// render and records every command it was asked to start.
#[derive(Default)]
struct FakeHost {
    /// `(program, input file name)` pairs that exit with status 1.
    failing: Vec<(&'static str, &'static str)>,
    installed: Vec<&'static str>,
    runs: Vec<Invocation>,
    launches: Vec<Invocation>,
}

fn strings(inv: &Invocation) -> Vec<String> {
    inv.args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

impl ProcessHost for FakeHost {
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<RunStatus> {
        self.runs.push(invocation.clone());
        let args = strings(invocation);
        let o = args.iter().position(|a| a == "-o").expect("-o present");
        let input = Path::new(&args[o - 1]);
        let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if self
            .failing
            .iter()
            .any(|(p, n)| *p == invocation.program && *n == name)
        {
            return Ok(RunStatus { code: Some(1) });
        }
        fs::write(&args[o + 1], format!("<svg><!-- {name} --></svg>"))?;
        Ok(RunStatus { code: Some(0) })
    }

    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<()> {
        self.launches.push(invocation.clone());
        Ok(())
    }

    fn is_available(&self, program: &str) -> bool {
        self.installed.iter().any(|p| *p == program)
    }
}

struct Fixture {
    inputs: tempfile::TempDir,
    outputs: tempfile::TempDir,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let inputs = tempfile::tempdir().unwrap();
        for n in names {
            fs::write(inputs.path().join(n), "digraph { a -> b }\n").unwrap();
        }
        Self {
            inputs,
            outputs: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> HarnessConfig {
        HarnessConfig {
            input_dir: self.inputs.path().to_path_buf(),
            temp_dir: Some(self.outputs.path().to_path_buf()),
            candidate: RendererConfig {
                program: "candidate".to_string(),
                args: Vec::new(),
            },
            reference: RendererConfig {
                program: "reference".to_string(),
                args: Vec::new(),
            },
            viewer: ViewerConfig {
                preferred: "viewer".to_string(),
                args: Vec::new(),
                fallback: Some(RendererConfig {
                    program: "opener".to_string(),
                    args: Vec::new(),
                }),
            },
            ..Default::default()
        }
    }
}

fn input_name(inv: &Invocation) -> String {
    let args = strings(inv);
    let o = args.iter().position(|a| a == "-o").unwrap();
    Path::new(&args[o - 1])
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

fn output_of(inv: &Invocation) -> PathBuf {
    let args = strings(inv);
    let o = args.iter().position(|a| a == "-o").unwrap();
    PathBuf::from(&args[o + 1])
}

#[test]
fn both_renderers_succeed_and_viewer_gets_all_outputs() {
    let fx = Fixture::new(&["graph1.dot", "graph2.dot"]);
    let host = FakeHost {
        installed: vec!["viewer"],
        ..Default::default()
    };
    let mut orch = Orchestrator::new(fx.config(), host);
    let report = orch.run().unwrap();
    assert_eq!(orch.phase(), Phase::Done);

    assert_eq!(report.inputs, 2);
    assert_eq!(report.jobs, 4);
    assert_eq!(report.result.len(), 4);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report.dispatch,
        Dispatch::Preferred {
            program: "viewer".to_string(),
            count: 4
        }
    );

    let host = orch.into_host();
    let order: Vec<(String, String)> = host
        .runs
        .iter()
        .map(|r| (r.program.clone(), input_name(r)))
        .collect();
    assert_eq!(
        order,
        [
            ("candidate".to_string(), "graph1.dot".to_string()),
            ("reference".to_string(), "graph1.dot".to_string()),
            ("candidate".to_string(), "graph2.dot".to_string()),
            ("reference".to_string(), "graph2.dot".to_string()),
        ]
    );

    assert_eq!(host.launches.len(), 1);
    let opened: Vec<PathBuf> = host.launches[0].args.iter().map(PathBuf::from).collect();
    assert_eq!(opened.as_slice(), report.result.paths());
    for p in report.result.iter() {
        assert!(p.starts_with(fx.outputs.path()));
        assert!(fs::metadata(p).unwrap().len() > 0, "{} empty", p.display());
    }
}

#[test]
fn only_marker_filter_restricts_inputs() {
    let fx = Fixture::new(&["graphA.dot", "graphA_html.dot"]);
    let mut cfg = fx.config();
    cfg.filter = Some("only-html".to_string());
    let mut orch = Orchestrator::new(cfg, FakeHost::default());
    let report = orch.run().unwrap();

    assert_eq!(report.inputs, 1);
    assert_eq!(report.result.len(), 2);
    let host = orch.into_host();
    assert!(host.runs.iter().all(|r| input_name(r) == "graphA_html.dot"));
}

#[test]
fn skip_marker_filter_drops_marked_inputs() {
    let fx = Fixture::new(&["graphA.dot", "graphA_html.dot"]);
    let mut cfg = fx.config();
    cfg.filter = Some("skip-html".to_string());
    let mut orch = Orchestrator::new(cfg, FakeHost::default());
    let report = orch.run().unwrap();

    assert_eq!(report.inputs, 1);
    let host = orch.into_host();
    assert!(host.runs.iter().all(|r| input_name(r) == "graphA.dot"));
}

#[test]
fn unmatched_filter_is_a_quiet_empty_run() {
    let fx = Fixture::new(&["graph1.dot", "graph2.dot"]);
    let mut cfg = fx.config();
    cfg.filter = Some("nothing-like-this".to_string());
    let mut orch = Orchestrator::new(cfg, FakeHost::default());
    let report = orch.run().unwrap();

    assert_eq!(orch.phase(), Phase::Done);
    assert_eq!(report.inputs, 0);
    assert_eq!(report.jobs, 0);
    assert!(report.result.is_empty());
    assert_eq!(report.dispatch, Dispatch::Nothing);
    let host = orch.into_host();
    assert!(host.runs.is_empty());
    assert!(host.launches.is_empty());
}

#[test]
fn keep_going_skips_a_failed_candidate() {
    let fx = Fixture::new(&["a.dot", "b.dot", "c.dot"]);
    let host = FakeHost {
        failing: vec![("candidate", "b.dot")],
        installed: vec!["viewer"],
        ..Default::default()
    };
    let mut orch = Orchestrator::new(fx.config(), host);
    let report = orch.run().unwrap();

    assert_eq!(orch.phase(), Phase::Done);
    assert_eq!(report.jobs, 6);
    assert_eq!(report.result.len(), 5);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, RendererKind::Candidate);
    assert!(report.skipped[0].input.ends_with("b.dot"));

    let host = orch.into_host();
    let failed_output = output_of(&host.runs[2]);
    assert_eq!(input_name(&host.runs[2]), "b.dot");
    assert!(!report.result.paths().contains(&failed_output));
    // b.dot's reference output is still collected.
    assert!(report.result.paths().contains(&output_of(&host.runs[3])));
    for p in report.result.iter() {
        assert!(fs::metadata(p).unwrap().len() > 0);
    }
}

#[test]
fn candidate_outputs_match_successful_candidate_runs() {
    let fx = Fixture::new(&["a.dot", "b.dot", "c.dot", "d.dot"]);
    let host = FakeHost {
        failing: vec![("candidate", "a.dot"), ("candidate", "d.dot")],
        ..Default::default()
    };
    let mut cfg = fx.config();
    cfg.run_reference = false;
    let mut orch = Orchestrator::new(cfg, host).with_viewer(false);
    let report = orch.run().unwrap();

    assert_eq!(report.jobs, 4);
    assert_eq!(report.result.len(), 2);
    assert_eq!(report.dispatch, Dispatch::Nothing);
    let host = orch.into_host();
    assert!(host.runs.iter().all(|r| r.program == "candidate"));
    assert!(host.launches.is_empty());
}

#[test]
fn missing_viewer_falls_back_to_one_open_per_output_in_order() {
    let fx = Fixture::new(&["graph1.dot", "graph2.dot"]);
    let mut orch = Orchestrator::new(fx.config(), FakeHost::default());
    let report = orch.run().unwrap();

    assert_eq!(
        report.dispatch,
        Dispatch::Fallback {
            program: "opener".to_string(),
            opened: 4,
            failed: 0
        }
    );
    let host = orch.into_host();
    assert_eq!(host.launches.len(), 4);
    for (launch, path) in host.launches.iter().zip(report.result.iter()) {
        assert_eq!(launch.program, "opener");
        assert_eq!(launch.args.len(), 1);
        assert_eq!(Path::new(&launch.args[0]), path);
    }
}

#[test]
fn fail_fast_stops_at_the_first_failure() {
    let fx = Fixture::new(&["a.dot", "b.dot", "c.dot"]);
    let host = FakeHost {
        failing: vec![("reference", "b.dot")],
        installed: vec!["viewer"],
        ..Default::default()
    };
    let mut cfg = fx.config();
    cfg.fail_fast = true;
    let mut orch = Orchestrator::new(cfg, host);
    let err = orch.run().unwrap_err();

    assert_eq!(orch.phase(), Phase::Failed);
    let Error::Render(failure) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(failure.kind, RendererKind::Reference);
    assert!(failure.input.ends_with("b.dot"));
    assert!(err.to_string().contains("reference"));

    let host = orch.into_host();
    assert!(host.runs.iter().all(|r| input_name(r) != "c.dot"));
    assert_eq!(host.runs.len(), 4);
    assert!(host.launches.is_empty());
}

#[test]
fn forwarded_flags_only_reach_the_candidate() {
    let fx = Fixture::new(&["g.dot"]);
    let mut orch = Orchestrator::new(fx.config(), FakeHost::default())
        .with_forwarded(vec!["--no-optz".to_string(), "-d".to_string()])
        .with_viewer(false);
    orch.run().unwrap();

    let host = orch.into_host();
    let cand = strings(&host.runs[0]);
    let refr = strings(&host.runs[1]);
    assert_eq!(host.runs[0].program, "candidate");
    assert_eq!(&cand[cand.len() - 2..], ["--no-optz", "-d"]);
    assert_eq!(refr.len(), 3);
    assert!(!refr.iter().any(|a| a == "--no-optz" || a == "-d"));
}

#[test]
fn missing_input_dir_depends_on_policy() {
    let fx = Fixture::new(&[]);
    let mut cfg = fx.config();
    cfg.input_dir = fx.inputs.path().join("does-not-exist");

    let mut tolerant = Orchestrator::new(cfg.clone(), FakeHost::default());
    let report = tolerant.run().unwrap();
    assert_eq!(report.inputs, 0);
    assert_eq!(tolerant.phase(), Phase::Done);

    cfg.fail_fast = true;
    let mut strict = Orchestrator::new(cfg, FakeHost::default());
    let err = strict.run().unwrap_err();
    assert!(matches!(err, Error::ReadInputDir { .. }));
    assert_eq!(strict.phase(), Phase::Failed);
}

#[test]
fn outputs_are_unique_across_the_run() {
    let names: Vec<String> = (0..40).map(|i| format!("g{i:02}.dot")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let fx = Fixture::new(&refs);
    let mut orch = Orchestrator::new(fx.config(), FakeHost::default()).with_viewer(false);
    let report = orch.run().unwrap();

    assert_eq!(report.result.len(), 80);
    let host = orch.into_host();
    let mut outs: Vec<PathBuf> = host.runs.iter().map(output_of).collect();
    outs.sort();
    outs.dedup();
    assert_eq!(outs.len(), 80);
}
