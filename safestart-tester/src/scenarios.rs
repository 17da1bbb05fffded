//! Named logic scenarios driven against the progress engine.
use anyhow::{Context, Result, ensure};
use std::path::PathBuf;

use safestart_core::constants::HINT_IDLE_MS;
use safestart_core::{
    ChecklistOutcome, ExploreCategory, FileStore, Hotspot, HotspotEditor, KeyValueStore,
    MemoryStore, Microsite, QuizStep, RevealOutcome, Season, StorageKey, SurfaceRect,
};

use crate::assets::TesterAssets;

pub struct ScenarioCtx<'a> {
    pub assets: &'a TesterAssets,
    pub verbose: bool,
    pub iteration: usize,
}

impl ScenarioCtx<'_> {
    fn open<S: KeyValueStore + Clone>(&self, store: S) -> Result<Microsite<S>> {
        Microsite::from_loader(self.assets, store)
    }

    fn note(&self, message: &str) {
        if self.verbose {
            println!("   · {message}");
        }
    }
}

type ScenarioFn = fn(&ScenarioCtx<'_>) -> Result<()>;

pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// # Errors
    ///
    /// Returns the first failed expectation.
    pub fn run(&self, ctx: &ScenarioCtx<'_>) -> Result<()> {
        (self.run)(ctx)
    }
}

const CATALOG: &[Scenario] = &[
    Scenario {
        name: "smoke",
        description: "One interaction per section moves every section score",
        run: smoke,
    },
    Scenario {
        name: "perfect-run",
        description: "Completing every activity reaches 100% and the top rank",
        run: perfect_run,
    },
    Scenario {
        name: "reset",
        description: "Global reset clears every key and returns the score to 0%",
        run: reset,
    },
    Scenario {
        name: "corrupted-store",
        description: "Garbage in every key degrades to default slices",
        run: corrupted_store,
    },
    Scenario {
        name: "file-persistence",
        description: "Progress written to a store file survives a reopen",
        run: file_persistence,
    },
    Scenario {
        name: "hint-timer",
        description: "Idle hint fires after the delay and stops once cleared",
        run: hint_timer,
    },
    Scenario {
        name: "editor-drag",
        description: "Dragging a hotspot clamps to the surface and exports JSON",
        run: editor_drag,
    },
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.name, s.description)).collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<&'static Scenario> {
    CATALOG.iter().find(|s| s.name == name)
}

/// Split a comma-separated list, expanding `all` to the full catalog.
#[must_use]
pub fn expand_scenarios(arg: &str) -> Vec<String> {
    let mut names: Vec<String> = arg
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.iter().any(|n| n == "all") {
        names.retain(|n| n != "all");
        for (name, _) in list_scenarios() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn answer_every_question<S: KeyValueStore + Clone>(site: &mut Microsite<S>) -> Result<u8> {
    loop {
        let answer = site
            .current_question()
            .map(|q| q.answer.clone())
            .context("quiz ended before finishing")?;
        site.answer_quiz(&answer)?;
        if let QuizStep::Finished { score } = site.advance_quiz()? {
            return Ok(score);
        }
    }
}

fn complete_everything<S: KeyValueStore + Clone>(site: &mut Microsite<S>) -> Result<()> {
    let content = site.content().clone();
    if !content.quiz.is_empty() {
        answer_every_question(site)?;
    }
    for item in &content.checklist {
        site.toggle_checklist(&item.id)?;
    }
    site.show_checklist_result();
    for spot in content.hotspots() {
        site.reveal_hazard(&spot.id, 0);
    }
    for category in ExploreCategory::ALL {
        if category == ExploreCategory::Seasons {
            continue;
        }
        for id in content.explorable_ids(category) {
            site.mark_opened(category, id)?;
        }
    }
    for season in Season::ALL {
        site.select_season(season);
    }
    Ok(())
}

fn smoke(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let mut site = ctx.open(MemoryStore::new())?;
    let fresh = site.calculate_score();
    ensure!(fresh.max_points > 0, "content offers no points");
    ensure!(fresh.earned_points == 0, "fresh store should score 0");

    let content = site.content().clone();
    if let Some(question) = content.quiz.first() {
        site.answer_quiz(&question.answer)?;
    }
    if let Some(item) = content.checklist.first() {
        ensure!(site.toggle_checklist(&item.id)?, "first toggle should check");
    }
    if let Some(spot) = content.hotspots().first() {
        site.reveal_hazard(&spot.id, 0);
    }
    site.select_season(Season::Snow);

    let score = site.calculate_score();
    ctx.note(&format!(
        "earned {}/{} ({}%)",
        score.earned_points, score.max_points, score.percent
    ));
    for section in score.sections.iter() {
        ensure!(
            section.earned > 0 || section.max == 0,
            "section {} did not move",
            section.label
        );
        ensure!(
            section.earned <= section.max,
            "section {} over max",
            section.label
        );
    }
    Ok(())
}

fn perfect_run(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let mut site = ctx.open(MemoryStore::new())?;
    complete_everything(&mut site)?;

    if !site.content().quiz.is_empty() {
        ensure!(
            site.quiz().state().score == Some(100),
            "quiz score should be 100"
        );
    }
    ensure!(
        site.checklist().state().result == Some(ChecklistOutcome::Green),
        "full checklist should be green"
    );
    if !site.content().hotspots().is_empty() {
        ensure!(site.hazard().state().completed, "hazards should be cleared");
    }
    let score = site.calculate_score();
    ensure!(
        score.earned_points == score.max_points,
        "earned {} of {}",
        score.earned_points,
        score.max_points
    );
    ensure!(score.percent == 100, "percent {}", score.percent);
    let expected = site.ranks().title_for(100);
    ensure!(
        score.rank_title == expected,
        "rank {} expected {expected}",
        score.rank_title
    );
    ctx.note(&format!("rank: {}", score.rank_title));
    Ok(())
}

fn reset(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let store = MemoryStore::new();
    let mut site = ctx.open(store.clone())?;
    complete_everything(&mut site)?;
    site.set_muted(false);
    ensure!(!store.is_empty(), "progress should be persisted");

    site.reset_all();
    ensure!(store.is_empty(), "keys left after reset: {:?}", store.snapshot());
    ensure!(site.calculate_score().percent == 0, "score after reset");
    ensure!(site.session().muted, "mute should default back on");

    let reopened = ctx.open(store)?;
    ensure!(
        reopened.calculate_score().earned_points == 0,
        "reopened store still scores"
    );
    Ok(())
}

fn corrupted_store(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let store = MemoryStore::new();
    for key in StorageKey::ALL {
        store.set(key.as_str(), "{\u{0}corrupt")?;
    }
    let mut site = ctx.open(store.clone())?;
    let score = site.calculate_score();
    ensure!(score.earned_points == 0, "corrupt data scored {}", score.earned_points);
    ensure!(
        site.session().season == Season::default(),
        "corrupt season should fall back to the default"
    );
    ensure!(site.session().last_visit.is_none(), "corrupt visit timestamp parsed");

    let content = site.content().clone();
    if let Some(item) = content.checklist.first() {
        site.toggle_checklist(&item.id)?;
        let raw = store
            .get(StorageKey::Checklist.as_str())?
            .context("checklist slice missing after toggle")?;
        ensure!(raw.starts_with('{'), "checklist slice was not rewritten");
    }
    Ok(())
}

fn scratch_store_path(ctx: &ScenarioCtx<'_>) -> PathBuf {
    std::env::temp_dir().join(format!(
        "safestart-tester-{}-{}.json",
        std::process::id(),
        ctx.iteration
    ))
}

fn file_persistence(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let path = scratch_store_path(ctx);
    let _ = std::fs::remove_file(&path);
    let outcome = (|| -> Result<()> {
        let mut site = ctx.open(FileStore::new(&path))?;
        let content = site.content().clone();
        if let Some(question) = content.quiz.first() {
            site.answer_quiz(&question.answer)?;
        }
        if let Some(spot) = content.hotspots().first() {
            site.reveal_hazard(&spot.id, 0);
        }
        site.select_season(Season::Frost);
        let before = site.calculate_score();

        let reopened = ctx.open(FileStore::new(&path))?;
        ensure!(
            reopened.calculate_score() == before,
            "score changed across reopen"
        );
        ensure!(
            reopened.session().season == Season::Frost,
            "season not persisted"
        );
        ctx.note(&format!("store file: {}", path.display()));
        Ok(())
    })();
    let _ = std::fs::remove_file(&path);
    outcome
}

fn hint_timer(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let mut site = ctx.open(MemoryStore::new())?;
    let spots: Vec<Hotspot> = site.content().hotspots().to_vec();
    let Some(first) = spots.first() else {
        ctx.note("no hotspots; skipping");
        return Ok(());
    };

    site.start_hazard_watch(0);
    ensure!(!site.poll_hint(HINT_IDLE_MS - 1), "hint fired early");
    ensure!(site.poll_hint(HINT_IDLE_MS), "hint did not fire");
    let target = site.take_hint().map(|spot| spot.id.clone());
    ensure!(
        target.as_deref() == Some(first.id.as_str()),
        "hint should point at the first unfound hotspot"
    );

    let mut now = HINT_IDLE_MS;
    for spot in &spots {
        now += 1_000;
        if site.reveal_hazard(&spot.id, now) == RevealOutcome::Cleared {
            ctx.note(&format!("cleared at {now}ms"));
        }
    }
    ensure!(
        !site.poll_hint(now + HINT_IDLE_MS * 2),
        "hint fired after clearing"
    );
    Ok(())
}

fn editor_drag(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let site = ctx.open(MemoryStore::new())?;
    let hotspots = site.content().hotspots().to_vec();
    let count = hotspots.len();
    let Some(first) = hotspots.first().map(|spot| spot.id.clone()) else {
        ctx.note("no hotspots; skipping");
        return Ok(());
    };

    let rect = SurfaceRect::new(0.0, 0.0, 800.0, 450.0);
    let mut editor = HotspotEditor::new(hotspots);
    ensure!(editor.drag_start(&first), "could not bind {first}");
    let inside = editor
        .drag_move(rect, 200.0, 150.0)
        .context("drag_move returned nothing")?;
    ensure!(
        (inside.x - 0.25).abs() < 1e-9 && (inside.y - 0.33).abs() < 1e-9,
        "unexpected point {inside:?}"
    );
    let outside = editor
        .drag_move(rect, -50.0, 9_000.0)
        .context("drag_move returned nothing")?;
    ensure!(
        outside.x == 0.0 && outside.y == 1.0,
        "pointer outside did not clamp: {outside:?}"
    );
    editor.drag_end();

    let exported: Vec<Hotspot> = serde_json::from_str(&editor.export_json()?)?;
    ensure!(exported.len() == count, "export lost hotspots");
    ensure!(
        exported.first().is_some_and(|s| s.x == 0.0 && s.y == 1.0),
        "export does not carry the moved position"
    );
    Ok(())
}
