use std::{
    collections::BTreeMap,
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use fasttap::{
    ActivationSignal, Capabilities, Disposition, FastTap, NodeId, Options, PlatformProbe, Point,
    Rect, RegionEvent, ScrollOffset, TouchInput, TouchPhase, TouchPoint, VirtualTree, VisualTree,
};

const HEADER: &str = "effect,ms,token";

#[derive(Clone, Debug)]
enum Step {
    Scroll { ms: u64, scroll: ScrollOffset },
    Touch { ms: u64, phase: TouchPhase, page: Point, client: Point },
    Click { ms: u64, cancelable: bool },
    Tick { ms: u64 },
}

impl Step {
    fn ms(&self) -> u64 {
        match self {
            Step::Scroll { ms, .. }
            | Step::Touch { ms, .. }
            | Step::Click { ms, .. }
            | Step::Tick { ms } => *ms,
        }
    }
}

struct Scene {
    tree: VirtualTree,
    names: BTreeMap<String, NodeId>,
    options: Options,
    user_agent: String,
    steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Effect {
    ms: u64,
    token: String,
}

fn main() {
    let _ = env_logger::builder().format_timestamp(None).try_init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut scene_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if scene_path.is_some() {
                    return Err("multiple scene paths provided".into());
                }
                scene_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let scene_path = scene_path.ok_or_else(usage)?;
    let scene = parse_scene(&scene_path)?;
    let effects = replay(scene)?;

    println!("{HEADER}");
    for effect in &effects {
        println!("effect,{},{}", effect.ms, effect.token);
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_tokens(&expect_path)?;
        let actual: Vec<&str> = effects.iter().map(|e| e.token.as_str()).collect();
        if actual != expected {
            eprintln!("expected effects: {}", expected.join(","));
            eprintln!("actual effects:   {}", actual.join(","));
            return Err("effect sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: tap_replay <scene.csv> [--expect expected_effects.txt]".to_string()
}

fn replay(scene: Scene) -> Result<Vec<Effect>, String> {
    let Scene {
        mut tree,
        names,
        options,
        user_agent,
        steps,
    } = scene;
    let caps = Capabilities::detect(&PlatformProbe {
        user_agent: &user_agent,
        touch_start_supported: true,
        device_pixel_ratio: 1.0,
        stop_immediate_propagation: true,
    });
    let region = tree.root();
    let mut fast = FastTap::create(&mut tree, region, &options, caps)
        .map_err(|e| format!("bind failed: {e}"))?;

    let label_of = |node: NodeId| -> String {
        names
            .iter()
            .find(|(_, id)| **id == node)
            .map_or_else(|| format!("#{}", node.0), |(name, _)| name.clone())
    };

    let mut effects = Vec::new();
    for step in steps {
        let ms = step.ms();
        let focused_before = tree.focused();
        match step {
            Step::Scroll { scroll, .. } => tree.set_scroll(scroll),
            Step::Touch {
                phase,
                page,
                client,
                ..
            } => {
                let input = TouchInput::single(phase, ms, TouchPoint::new(page, client));
                fast.handle(&mut tree, &RegionEvent::Touch(input));
            }
            Step::Click { cancelable, .. } => {
                let signal = ActivationSignal::Native { t_ms: ms, cancelable };
                let disposition = fast.handle(&mut tree, &RegionEvent::Activation(signal));
                effects.push(Effect {
                    ms,
                    token: click_token(disposition).to_string(),
                });
            }
            Step::Tick { .. } => {
                fast.tick(&mut tree, ms);
            }
        }

        for own in tree.take_dispatched() {
            let disposition =
                fast.handle(&mut tree, &RegionEvent::Activation(ActivationSignal::Forwarded(own)));
            if disposition != Disposition::Continue {
                return Err(format!("forwarded activation at {ms}ms was blocked"));
            }
            effects.push(Effect {
                ms,
                token: format!("dispatch:{}", label_of(own.target)),
            });
        }
        if let Some(focused) = tree.focused().filter(|node| Some(*node) != focused_before) {
            effects.push(Effect {
                ms,
                token: format!("focus:{}", label_of(focused)),
            });
        }
    }

    fast.destroy(&mut tree);
    Ok(effects)
}

fn click_token(disposition: Disposition) -> &'static str {
    if disposition.lets_through() {
        "click:pass"
    } else {
        "click:suppress"
    }
}

fn parse_scene(path: &Path) -> Result<Scene, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut scene = Scene {
        tree: VirtualTree::new(),
        names: BTreeMap::new(),
        options: Options::default(),
        user_agent: String::new(),
        steps: Vec::new(),
    };

    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // JSON and user agents carry commas of their own.
        if let Some(json) = trimmed.strip_prefix("options,") {
            scene.options = serde_json::from_str(json)
                .map_err(|e| format!("{}:{} invalid options: {e}", path.display(), line_no))?;
            continue;
        }
        if let Some(ua) = trimmed.strip_prefix("platform,") {
            scene.user_agent = ua.trim().to_string();
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let at = Location { path, line_no };
        match parts[0] {
            "node" | "text" => {
                let (name, parent, rest) = match (parts[0], parts.as_slice()) {
                    ("node", [_, name, parent, _, rest @ ..]) => (name, parent, rest),
                    ("text", [_, name, parent, rest @ ..]) => (name, parent, rest),
                    _ => return Err(at.invalid("node line has too few columns")),
                };
                let [x, y, w, h] = rest else {
                    return Err(at.invalid("expected x,y,w,h bounds"));
                };
                let bounds = Rect::new(
                    at.f64(x, "x")?,
                    at.f64(y, "y")?,
                    at.f64(w, "w")?,
                    at.f64(h, "h")?,
                );
                let parent = scene.lookup(parent, &at)?;
                let node = if parts[0] == "node" {
                    scene.tree.append_element(parent, parts[3], bounds)
                } else {
                    scene.tree.append_text(parent, bounds)
                };
                scene.names.insert((*name).to_string(), node);
            }
            "attr" => {
                let [_, name, key, value] = parts.as_slice() else {
                    return Err(at.invalid("expected attr,node,name,value"));
                };
                let node = scene.lookup(name, &at)?;
                scene.tree.set_attribute(node, key, value);
            }
            "class" => {
                let [_, name, class] = parts.as_slice() else {
                    return Err(at.invalid("expected class,node,name"));
                };
                let node = scene.lookup(name, &at)?;
                scene.tree.add_class(node, class);
            }
            "label" => {
                let [_, label, control] = parts.as_slice() else {
                    return Err(at.invalid("expected label,label_node,control_node"));
                };
                let label = scene.lookup(label, &at)?;
                let control = scene.lookup(control, &at)?;
                scene.tree.set_label_for(label, control);
            }
            "scroll" => {
                let [_, ms, x, y] = parts.as_slice() else {
                    return Err(at.invalid("expected scroll,ms,x,y"));
                };
                scene.steps.push(Step::Scroll {
                    ms: at.u64(ms, "ms")?,
                    scroll: ScrollOffset::new(at.f64(x, "x")?, at.f64(y, "y")?),
                });
            }
            "touch" => {
                let [_, ms, phase, page_x, page_y, rest @ ..] = parts.as_slice() else {
                    return Err(at.invalid("expected touch,ms,phase,page_x,page_y"));
                };
                let page = Point::new(at.f64(page_x, "page_x")?, at.f64(page_y, "page_y")?);
                let client = match rest {
                    [] => page,
                    [x, y] => Point::new(at.f64(x, "client_x")?, at.f64(y, "client_y")?),
                    _ => return Err(at.invalid("expected client_x,client_y")),
                };
                scene.steps.push(Step::Touch {
                    ms: at.u64(ms, "ms")?,
                    phase: at.phase(phase)?,
                    page,
                    client,
                });
            }
            "click" => {
                let (ms, cancelable) = match parts.as_slice() {
                    [_, ms] => (ms, true),
                    [_, ms, "programmatic"] => (ms, false),
                    _ => return Err(at.invalid("expected click,ms[,programmatic]")),
                };
                scene.steps.push(Step::Click {
                    ms: at.u64(ms, "ms")?,
                    cancelable,
                });
            }
            "tick" => {
                let [_, ms] = parts.as_slice() else {
                    return Err(at.invalid("expected tick,ms"));
                };
                scene.steps.push(Step::Tick {
                    ms: at.u64(ms, "ms")?,
                });
            }
            other => return Err(at.invalid(&format!("unknown record `{other}`"))),
        }
    }

    Ok(scene)
}

impl Scene {
    fn lookup(&self, name: &str, at: &Location<'_>) -> Result<NodeId, String> {
        if name == "root" {
            return Ok(self.tree.root());
        }
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| at.invalid(&format!("unknown node `{name}`")))
    }
}

struct Location<'a> {
    path: &'a Path,
    line_no: usize,
}

impl Location<'_> {
    fn invalid(&self, message: &str) -> String {
        format!("{}:{} {message}", self.path.display(), self.line_no)
    }

    fn f64(&self, raw: &str, field: &str) -> Result<f64, String> {
        raw.parse::<f64>()
            .map_err(|e| self.invalid(&format!("invalid {field} '{raw}': {e}")))
    }

    fn u64(&self, raw: &str, field: &str) -> Result<u64, String> {
        raw.parse::<u64>()
            .map_err(|e| self.invalid(&format!("invalid {field} '{raw}': {e}")))
    }

    fn phase(&self, raw: &str) -> Result<TouchPhase, String> {
        match raw.to_ascii_lowercase().as_str() {
            "start" => Ok(TouchPhase::Start),
            "move" => Ok(TouchPhase::Move),
            "end" => Ok(TouchPhase::End),
            "cancel" => Ok(TouchPhase::Cancel),
            _ => Err(self.invalid(&format!("invalid touch phase '{raw}'"))),
        }
    }
}

fn parse_expected_tokens(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tokens = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        if !["dispatch:", "focus:", "click:"]
            .iter()
            .any(|prefix| token.starts_with(prefix))
        {
            return Err(format!(
                "{}:{} invalid expected effect: {}",
                path.display(),
                line_no,
                token
            ));
        }
        tokens.push(token.to_string());
    }

    Ok(tokens)
}
