use mamecontrols::controls::{
    Configured, ControlEngine, EngineError, EngineSettings, GameControls, Ready, NOT_MAPPED,
};
use mamecontrols::gamedata::{GameDataError, ResolvePolicy};
use std::path::{Path, PathBuf};

const GAMEDATA: &str = r#"{
    "sf2": {
        "description": "Street Fighter II",
        "playercount": 2,
        "buttons": 6,
        "sticks": 1,
        "controls": {
            "P1_JOYSTICK_UP": {"name": "Jump"},
            "P1_BUTTON1": {"name": "Jab Punch"},
            "P1_BUTTON2": {"name": "Strong Punch"},
            "P2_BUTTON1": {}
        },
        "clones": {
            "sf2ua": {"description": "Street Fighter II (USA)"},
            "sf2j": {
                "description": "Street Fighter II (Japan)",
                "controls": {"P1_BUTTON1": {"name": "Light Punch"}}
            }
        }
    },
    "puckman": {"description": "Puck Man"}
}"#;

const DEFAULT_CFG: &str = r#"<?xml version="1.0"?>
<mameconfig version="10">
    <system name="default">
        <input>
            <port type="P1_JOYSTICK_UP">
                <newseq type="standard">KEYCODE_UP OR JOYCODE_1_HAT1UP</newseq>
            </port>
            <port type="P1_BUTTON1">
                <newseq type="standard">KEYCODE_LCONTROL OR JOYCODE_1_BUTTON1</newseq>
            </port>
        </input>
    </system>
</mameconfig>"#;

const SF2_CFG: &str = r#"<?xml version="1.0"?>
<mameconfig version="10">
    <system name="sf2">
        <input>
            <port tag=":IN1" type="P1_BUTTON1" mask="16" defvalue="16">
                <newseq type="standard">JOYCODE_1_BUTTON3</newseq>
            </port>
            <port tag=":IN0" type="UI_PAUSE" mask="1" defvalue="1">
                <newseq type="standard">JOYCODE_1_BUTTON8</newseq>
            </port>
        </input>
    </system>
</mameconfig>"#;

/// Throwaway MAME directory that removes itself
struct MameDir(PathBuf);

impl MameDir {
    async fn create(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "mamecontrols-it-{}-{}",
            name,
            std::process::id()
        ));
        let _ = tokio::fs::remove_dir_all(&root).await;
        tokio::fs::create_dir_all(root.join("cfg")).await.unwrap();
        tokio::fs::create_dir_all(root.join("preview")).await.unwrap();
        tokio::fs::write(root.join("preview/gamedata.json"), GAMEDATA)
            .await
            .unwrap();
        MameDir(root)
    }

    async fn write(&self, relative: &str, content: &str) {
        tokio::fs::write(self.0.join(relative), content).await.unwrap();
    }

    fn settings(&self) -> EngineSettings {
        EngineSettings::new(self.0.join("preview/gamedata.json"), self.0.join("cfg"))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for MameDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

async fn ready(settings: EngineSettings) -> ControlEngine<Ready> {
    ControlEngine::<Configured>::create(settings)
        .load()
        .await
        .unwrap()
}

fn mapping_of<'a>(controls: &'a GameControls, control_id: &str) -> &'a str {
    controls
        .rows()
        .iter()
        .find(|row| row.control_id == control_id)
        .map(|row| row.current_mapping.as_str())
        .unwrap()
}

#[tokio::test]
async fn override_then_global_default_then_unmapped() {
    let dir = MameDir::create("precedence").await;
    dir.write("cfg/default.cfg", DEFAULT_CFG).await;
    dir.write("cfg/sf2.cfg", SF2_CFG).await;
    let engine = ready(dir.settings()).await;

    let controls = engine.game_controls("sf2").await;
    let GameControls::Resolved(game) = &controls else {
        panic!("sf2 should resolve");
    };
    assert_eq!(game.display_name, "Street Fighter II");
    assert_eq!(game.player_count, 2);
    assert!(!game.inherited);

    let ids: Vec<_> = game.rows.iter().map(|r| r.control_id.as_str()).collect();
    assert_eq!(ids, ["P1_JOYSTICK_UP", "P1_BUTTON1", "P1_BUTTON2", "P2_BUTTON1"]);

    assert_eq!(mapping_of(&controls, "P1_BUTTON1"), "JOYCODE_1_BUTTON3");
    assert!(game.rows[1].is_customized);
    assert_eq!(mapping_of(&controls, "P1_JOYSTICK_UP"), "JOYCODE_1_HAT1UP");
    assert!(!game.rows[0].is_customized);
    assert_eq!(mapping_of(&controls, "P1_BUTTON2"), NOT_MAPPED);
    assert_eq!(game.rows[3].default_label, "P2 Button 1");
}

#[tokio::test]
async fn clone_without_controls_inherits() {
    let dir = MameDir::create("inherit").await;
    let engine = ready(dir.settings()).await;

    let GameControls::Resolved(game) = engine.game_controls("sf2ua").await else {
        panic!("sf2ua should resolve through its parent");
    };
    assert_eq!(game.display_name, "Street Fighter II (USA)");
    assert_eq!(game.source_id, "sf2");
    assert!(game.inherited);
    assert_eq!(game.rows.len(), 4);

    // Own controls replace the parent's entirely
    let GameControls::Resolved(own) = engine.game_controls("sf2j").await else {
        panic!("sf2j has its own controls");
    };
    assert!(!own.inherited);
    assert_eq!(own.rows.len(), 1);
    assert_eq!(own.rows[0].default_label, "Light Punch");
}

#[tokio::test]
async fn clone_does_not_read_parent_cfg() {
    let dir = MameDir::create("clone-cfg").await;
    dir.write("cfg/sf2.cfg", SF2_CFG).await;
    let engine = ready(dir.settings()).await;

    let controls = engine.game_controls("sf2ua").await;
    assert_eq!(mapping_of(&controls, "P1_BUTTON1"), NOT_MAPPED);
}

#[tokio::test]
async fn translation_to_xinput() {
    let dir = MameDir::create("xinput").await;
    dir.write("cfg/default.cfg", DEFAULT_CFG).await;
    dir.write("cfg/sf2.cfg", SF2_CFG).await;
    let mut settings = dir.settings();
    settings.translate_to_standard = true;
    let engine = ready(settings).await;

    let controls = engine.game_controls("sf2").await;
    assert_eq!(mapping_of(&controls, "P1_BUTTON1"), "XINPUT_1_X");
    assert_eq!(mapping_of(&controls, "P1_JOYSTICK_UP"), "XINPUT_1_DPAD_UP");
}

#[tokio::test]
async fn broken_cfg_files_fall_back_to_defaults() {
    let dir = MameDir::create("broken").await;
    dir.write("cfg/default.cfg", "<mameconfig><system>").await;
    dir.write("cfg/sf2.cfg", "not xml at all").await;
    let engine = ready(dir.settings()).await;
    assert!(engine.defaults().is_empty());

    let controls = engine.game_controls("sf2").await;
    assert!(controls.is_found());
    assert!(controls
        .rows()
        .iter()
        .all(|row| row.current_mapping == NOT_MAPPED && !row.is_customized));
}

#[tokio::test]
async fn not_found_cases() {
    let dir = MameDir::create("not-found").await;
    let engine = ready(dir.settings()).await;

    let unknown = engine.game_controls("nosuchgame").await;
    assert!(matches!(unknown, GameControls::NotFound { ref rom_id, .. } if rom_id == "nosuchgame"));

    let bare = engine.game_controls("puckman").await;
    assert!(!bare.is_found());
    assert!(bare.rows().is_empty());
}

#[tokio::test]
async fn parent_only_policy_stops_after_one_hop() {
    let dir = MameDir::create("policy").await;
    dir.write(
        "preview/gamedata.json",
        r#"{
            "base": {
                "controls": {"P1_BUTTON1": {"name": "Fire"}},
                "clones": {"mid": {"clones": {"leaf": {}}}}
            }
        }"#,
    )
    .await;

    let chain = ready(dir.settings()).await;
    assert!(chain.game_controls("leaf").await.is_found());

    let mut settings = dir.settings();
    settings.resolve_policy = ResolvePolicy::ParentOnly;
    let parent_only = ready(settings).await;
    assert!(parent_only.game_controls("mid").await.is_found());
    assert!(!parent_only.game_controls("leaf").await.is_found());
}

#[tokio::test]
async fn reload_picks_up_new_gamedata() {
    let dir = MameDir::create("reload").await;
    let engine = ready(dir.settings()).await;
    let updates = engine.store().subscribe();
    assert!(!engine.game_controls("galaga").await.is_found());

    dir.write(
        "preview/gamedata.json",
        r#"{"galaga": {"controls": {"P1_BUTTON1": {"name": "Fire"}}}}"#,
    )
    .await;
    engine.reload().await.unwrap();

    assert!(updates.has_changed().unwrap());
    assert!(engine.game_controls("galaga").await.is_found());
    assert!(!engine.game_controls("sf2").await.is_found());

    // A broken document keeps the previous snapshot
    dir.write("preview/gamedata.json", "{ not json").await;
    assert!(engine.reload().await.is_err());
    assert!(engine.game_controls("galaga").await.is_found());
}

#[tokio::test]
async fn unreadable_gamedata_is_fatal() {
    let dir = MameDir::create("fatal").await;
    let settings = EngineSettings::new(dir.path().join("missing.json"), dir.path().join("cfg"));
    let result = ControlEngine::<Configured>::create(settings).load().await;
    assert!(matches!(
        result,
        Err(EngineError::GameData(GameDataError::Io { .. }))
    ));
}
