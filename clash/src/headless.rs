//! Headless mode for Quiz Clash.
//!
//! A line-oriented protocol on stdin/stdout, suitable for scripted play and
//! automated testing:
//! - Lines starting with `#` are commands (go, challenge, loot, status, quit)
//! - Any other line answers the current prompt (quiz answers, combat actions)
//! - Tagged lines (`[STATUS]`, `[EVENT]`, `[ERROR]`) are machine-friendly;
//!   with `--json` status and events are also printed as JSON objects

use crate::map::{Direction, SchoolMap};
use crate::roster::{Roster, RosterEntry};
use clash_core::quiz::answers_match;
use clash_core::regen::DEFAULT_REGEN_INTERVAL;
use clash_core::{
    ActionSource, CombatEvent, CombatStatus, EncounterError, LootTier, Luck, PlayerAction,
    QuizOutcome, Session, SessionConfig,
};
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// Settings for a headless run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    pub player_name: String,
    /// Fixed seed for a reproducible run; entropy otherwise.
    pub seed: Option<u64>,
    /// Also print status and events as JSON.
    pub json: bool,
    pub regen_interval: Duration,
}

impl HeadlessConfig {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            seed: None,
            json: false,
            regen_interval: DEFAULT_REGEN_INTERVAL,
        }
    }

    /// Defaults overridden by `CLASH_PLAYER_NAME`, `CLASH_SEED` and
    /// `CLASH_REGEN_INTERVAL_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new("Elev");
        if let Some(name) = lookup("CLASH_PLAYER_NAME").filter(|n| !n.trim().is_empty()) {
            config.player_name = name;
        }
        if let Some(raw) = lookup("CLASH_SEED") {
            match raw.trim().parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => warn!(target: "clash::config", value = %raw, error = %e, "ignoring CLASH_SEED"),
            }
        }
        if let Some(raw) = lookup("CLASH_REGEN_INTERVAL_MS") {
            match raw.trim().parse() {
                Ok(ms) => config.regen_interval = Duration::from_millis(ms),
                Err(e) => warn!(target: "clash::config", value = %raw, error = %e, "ignoring CLASH_REGEN_INTERVAL_MS"),
            }
        }
        config
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.player_name.clone()).with_regen_interval(self.regen_interval)
    }
}

/// Apply command line flags on top of `config`.
pub fn parse_config_from_args(args: &[String], mut config: HeadlessConfig) -> HeadlessConfig {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                if let Some(name) = args.get(i + 1) {
                    config.player_name = name.clone();
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(seed) = args.get(i + 1) {
                    match seed.parse() {
                        Ok(seed) => config.seed = Some(seed),
                        Err(e) => warn!(target: "clash::config", value = %seed, error = %e, "ignoring --seed"),
                    }
                    i += 1;
                }
            }
            "--regen-ms" => {
                if let Some(ms) = args.get(i + 1) {
                    match ms.parse() {
                        Ok(ms) => config.regen_interval = Duration::from_millis(ms),
                        Err(e) => warn!(target: "clash::config", value = %ms, error = %e, "ignoring --regen-ms"),
                    }
                    i += 1;
                }
            }
            "--json" => config.json = true,
            _ => {}
        }
        i += 1;
    }
    config
}

// ============================================================================
// Console
// ============================================================================

struct Console<R, W> {
    input: R,
    output: W,
    json: bool,
    eof: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    fn say(&mut self, text: impl AsRef<str>) {
        writeln!(self.output, "{}", text.as_ref()).ok();
    }

    fn prompt(&mut self, text: &str) {
        write!(self.output, "{text}").ok();
        self.output.flush().ok();
    }

    /// Next trimmed input line, or `None` once input is exhausted.
    fn read_line(&mut self) -> Option<String> {
        if self.eof {
            return None;
        }
        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => {
                self.eof = true;
                None
            }
            Ok(_) => Some(buf.trim().to_string()),
            Err(e) => {
                warn!(target: "clash::headless", error = %e, "error reading input");
                self.eof = true;
                None
            }
        }
    }

    fn emit<T: Serialize>(&mut self, tag: &str, value: &T) {
        if !self.json {
            return;
        }
        match serde_json::to_string(value) {
            Ok(json) => self.say(format!("[{tag}] {json}")),
            Err(e) => warn!(target: "clash::headless", error = %e, "failed to serialize {tag}"),
        }
    }
}

/// Reads combat actions from the console and narrates the fight.
struct TerminalPlayer<'a, R, W> {
    console: &'a RefCell<Console<R, W>>,
}

impl<R: BufRead, W: Write> ActionSource for TerminalPlayer<'_, R, W> {
    fn next_action(&mut self, status: &CombatStatus) -> PlayerAction {
        let mut console = self.console.borrow_mut();
        loop {
            let player = &status.player;
            console.say(format!(
                "=== {} === HP: {}/{}",
                status.opponent.name, status.opponent.health, status.opponent.max_health
            ));
            console.say(format!(
                "{}: HP: {} | Coins: {} | Potions: Normal({}) Epic({}) | Totems: {}",
                player.name,
                player.health,
                player.coins,
                player.normal_potions,
                player.epic_potions,
                player.totems
            ));
            console.emit("STATUS", status);
            console.say("Choose action: 1. Attack  2. Heal  3. Wait");
            console.prompt("> ");

            // Out of input: stand still until the fight resolves.
            let Some(line) = console.read_line() else {
                return PlayerAction::Wait;
            };
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                console.say("[ERROR] Finish the fight first: 1/attack <weapon>, 2/heal <normal|epic>, 3/wait");
                continue;
            }

            return match PlayerAction::parse(&line) {
                PlayerAction::Attack { weapon } if weapon.is_empty() => {
                    let names: Vec<&str> = player.weapons.iter().map(|w| w.name.as_str()).collect();
                    console.say(format!("Your weapons: {}", names.join(", ")));
                    console.prompt("Choose weapon: ");
                    PlayerAction::Attack {
                        weapon: console.read_line().unwrap_or_default(),
                    }
                }
                PlayerAction::Heal { potion } if potion.is_empty() => {
                    console.prompt("Choose potion type (normal/epic): ");
                    PlayerAction::Heal {
                        potion: console.read_line().unwrap_or_default(),
                    }
                }
                action => action,
            };
        }
    }

    fn observe(&mut self, event: &CombatEvent) {
        let mut console = self.console.borrow_mut();
        console.say(describe(event));
        console.emit("EVENT", event);
    }
}

fn describe(event: &CombatEvent) -> String {
    match event {
        CombatEvent::EncounterStarted {
            opponent,
            health,
            max_health,
            regenerating,
        } => {
            let extra = if *regenerating { " and regenerates!" } else { "" };
            format!("{opponent} steps up with {health}/{max_health} HP{extra}")
        }
        CombatEvent::RoundStarted { round } => format!("--- Round {round} ---"),
        CombatEvent::Attacked {
            weapon,
            damage,
            critical,
            opponent_health,
        } => {
            let crit = if *critical { "CRITICAL HIT! " } else { "" };
            format!("{crit}You attack with {weapon} and deal {damage} damage! (enemy HP: {opponent_health})")
        }
        CombatEvent::Healed {
            restored, health, ..
        } => format!("Healed {restored} HP! (HP: {health})"),
        CombatEvent::ActionRejected { error } => format!("[ERROR] {error}"),
        CombatEvent::Waited => "You wait and gather your strength...".to_string(),
        CombatEvent::TurnForfeited { .. } => "Invalid choice! You lose your turn...".to_string(),
        CombatEvent::Blocked { opponent, .. } => format!("You blocked the attack from {opponent}!"),
        CombatEvent::Hit {
            opponent,
            damage,
            health,
        } => format!("{opponent} attacks and deals {damage} damage! (HP: {health})"),
        CombatEvent::Regenerated(regen) => format!(
            "{} regenerates +{} HP! ({}/{})",
            regen.opponent, regen.amount, regen.health, regen.max_health
        ),
        CombatEvent::TotemUsed { totems_left } => {
            format!("=== TOTEM USED! HP RESTORED TO 100 === ({totems_left} left)")
        }
        CombatEvent::Victory { opponent, reward } => format!(
            "★ {opponent} defeated! ★ +{reward} coins\nTip: open a lootbox with #loot normal (5 coins) or #loot epic (15 coins)."
        ),
        CombatEvent::GameOver { .. } => "GAME OVER!".to_string(),
    }
}

// ============================================================================
// Game loop
// ============================================================================

/// A headless game over arbitrary input/output streams.
pub struct HeadlessGame<R, W, L> {
    console: RefCell<Console<R, W>>,
    session: Session,
    roster: Roster,
    map: SchoolMap,
    luck: L,
    finished: bool,
}

impl<R: BufRead, W: Write, L: Luck> HeadlessGame<R, W, L> {
    pub fn new(config: &HeadlessConfig, input: R, output: W, luck: L) -> Self {
        Self {
            console: RefCell::new(Console {
                input,
                output,
                json: config.json,
                eof: false,
            }),
            session: Session::new(config.session_config()),
            roster: Roster::standard(config.regen_interval),
            map: SchoolMap::new(),
            luck,
            finished: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True once an ending has been reached or the player quit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn say(&self, text: impl AsRef<str>) {
        self.console.borrow_mut().say(text);
    }

    /// Play until `#quit`, an ending, or end of input.
    pub fn run(&mut self) {
        self.say("=== Välkommen till Quiz Clash ===");
        self.say(format!("Player: {}", self.session.player().name()));
        self.say(HELP);
        self.say(self.map.render(|id| self.session.is_consumed(id)));

        while !self.finished {
            let line = {
                let mut console = self.console.borrow_mut();
                console.prompt("> ");
                console.read_line()
            };
            let Some(line) = line else {
                break;
            };
            if line.is_empty() {
                continue;
            }
            match line.strip_prefix('#') {
                Some(command) => self.command(command),
                None => self.say("[ERROR] Unknown input. Type #help for help."),
            }
        }
    }

    fn command(&mut self, command: &str) {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = parts.collect();
        let argument = rest.join(" ");
        debug!(target: "clash::headless", command = %name, %argument, "command");

        match name.as_str() {
            "quit" | "exit" => {
                self.say("Tack för att du har spelat Quiz Clash!");
                self.finished = true;
            }
            "help" => self.say(HELP),
            "status" => self.print_status(),
            "map" => self.say(self.map.render(|id| self.session.is_consumed(id))),
            "go" => match argument.parse::<Direction>() {
                Ok(direction) => self.walk(direction),
                Err(e) => self.say(format!("[ERROR] {e}")),
            },
            "challenge" => {
                let Some(code) = self.roster.by_name_mut(&argument).map(|e| e.code) else {
                    self.say(format!("[ERROR] Nobody called '{argument}' works here."));
                    return;
                };
                self.challenge(code);
            }
            "loot" => match argument.parse::<LootTier>() {
                Ok(tier) => self.open_lootbox(tier),
                Err(e) => self.say(format!("[ERROR] {e}")),
            },
            _ => self.say("[ERROR] Unknown command. Type #help for help."),
        }
    }

    fn walk(&mut self, direction: Direction) {
        let room = self.map.step(direction);
        let (row, col) = self.map.position();
        self.say(format!("You are at ({row}, {col})."));
        self.say(self.map.render(|id| self.session.is_consumed(id)));

        let Some(room) = room else {
            return;
        };
        if self.session.is_consumed(room.location) {
            return;
        }
        self.say("Du har anlänt till ett rum!");
        self.challenge(room.code);
        // Rooms fire once, win or lose.
        self.session.mark_consumed(room.location);
    }

    fn challenge(&mut self, code: char) {
        let Some(entry) = self.roster.by_code_mut(code) else {
            return;
        };
        let result = engage(&mut self.session, entry, &self.console, &mut self.luck);

        match result {
            Ok(()) => {}
            Err(EncounterError::OpponentAlreadyDefeated { name }) => {
                self.say(format!("{name} är redan besegrad."));
            }
            Err(EncounterError::PlayerDefeatedFatal) => {}
            Err(e) => self.say(format!("[ERROR] {e}")),
        }

        if self.session.is_over() {
            self.say(BAD_ENDING);
            self.finished = true;
        } else if self
            .roster
            .boss()
            .is_some_and(|boss| self.session.is_defeated(boss.opponent.id()))
        {
            self.say(GOOD_ENDING);
            self.finished = true;
        }
    }

    fn open_lootbox(&mut self, tier: LootTier) {
        match self.session.open_lootbox(tier, &mut self.luck) {
            Ok(drop) => {
                if drop.duplicate {
                    self.say(format!("Du har redan {} i inventoryt.", drop.item));
                } else {
                    self.say(format!("Du fick {}!", drop.item));
                }
                self.console.borrow_mut().emit("LOOT", &drop);
            }
            Err(e) => self.say(format!("[ERROR] {e}")),
        }
    }

    fn print_status(&self) {
        let status = self.session.status();
        let player = &status.player;
        let weapons: Vec<String> = player
            .weapons
            .iter()
            .map(|w| format!("{} ({})", w.name, w.damage))
            .collect();
        let mut console = self.console.borrow_mut();
        console.say("[STATUS]");
        console.say(format!("  Name: {}", player.name));
        console.say(format!("  HP: {}/{}", player.health, player.max_health));
        console.say(format!("  Coins: {}", player.coins));
        console.say(format!(
            "  Potions: Normal({}) Epic({})",
            player.normal_potions, player.epic_potions
        ));
        console.say(format!("  Totems: {}", player.totems));
        console.say(format!("  Weapons: {}", weapons.join(", ")));
        console.say(format!(
            "  Defeated: {}/{}",
            status.defeated,
            self.roster.entries().len()
        ));
        console.emit("STATUS", &status);
    }
}

/// Run one opponent's event: quiz for teachers, straight combat for the boss.
fn engage<R: BufRead, W: Write, L: Luck>(
    session: &mut Session,
    entry: &mut RosterEntry,
    console: &RefCell<Console<R, W>>,
    luck: &mut L,
) -> Result<(), EncounterError> {
    if session.is_defeated(entry.opponent.id()) {
        return Err(EncounterError::OpponentAlreadyDefeated {
            name: entry.opponent.name().to_string(),
        });
    }

    console.borrow_mut().say(format!(
        "{} ({}): {}",
        entry.opponent.name(),
        entry.subject,
        entry.greeting
    ));
    let mut player = TerminalPlayer { console };

    let Some(bank) = &entry.bank else {
        session.resolve_encounter(&mut entry.opponent, &mut player, luck)?;
        return Ok(());
    };

    let mut answers = |prompt: &str| {
        let mut console = console.borrow_mut();
        console.say(format!("Fråga: {prompt}"));
        console.prompt("Ditt svar: ");
        let given = console.read_line().unwrap_or_default();
        let correct = bank
            .answer_for(prompt)
            .is_some_and(|expected| answers_match(expected, &given));
        if correct {
            console.say("Rätt!");
        } else {
            console.say("Fel! Nu ska vi slåss!");
        }
        given
    };

    let outcome = session.resolve_quiz_gate(&mut entry.opponent, bank, &mut answers, &mut player, luck)?;
    if let QuizOutcome::InstantWin { reward } = outcome {
        console
            .borrow_mut()
            .say(format!("{} +{reward} coins", entry.praise));
    }
    Ok(())
}

/// Run a headless game on stdin/stdout.
pub fn run_headless<L: Luck>(config: &HeadlessConfig, luck: L) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    {
        let mut game = HeadlessGame::new(config, stdin.lock(), stdout.lock(), luck);
        game.run();
        debug!(
            target: "clash::headless",
            finished = game.is_finished(),
            encounters = game.session().encounters(),
            "headless game ended"
        );
    }
    io::stdout().flush()
}

const HELP: &str = "\
Commands:
  #go <n|s|e|w>       - Walk the school; rooms start their event
  #map                - Show the map
  #challenge <name>   - Challenge a teacher (or Lars) directly
  #loot <normal|epic> - Open a lootbox (5 or 15 coins)
  #status             - Show your status
  #help               - Show this help
  #quit               - Exit the game
In combat: 1/attack <weapon>, 2/heal <normal|epic>, 3/wait";

const BAD_ENDING: &str = "\
You Died!
    --Tack för att du har spelat Quiz Clash--
    --Spela igen för hela slutet--
    --Slut 1 av 4, (Bad ending)--";

const GOOD_ENDING: &str = "\
You win!
    --Tack för att du har spelat Quiz Clash--
    --Slut 2 av 4, (Good ending)--";

#[cfg(test)]
mod tests {
    use super::*;
    use clash_core::testing::ScriptedLuck;
    use std::io::Cursor;

    fn play(script: &str) -> (String, HeadlessGame<Cursor<Vec<u8>>, Vec<u8>, ScriptedLuck>) {
        play_with(HeadlessConfig::new("Tester"), script)
    }

    fn play_with(
        config: HeadlessConfig,
        script: &str,
    ) -> (String, HeadlessGame<Cursor<Vec<u8>>, Vec<u8>, ScriptedLuck>) {
        let input = Cursor::new(script.as_bytes().to_vec());
        let mut game = HeadlessGame::new(&config, input, Vec::new(), ScriptedLuck::new());
        game.run();
        let output = String::from_utf8_lossy(&game.console.borrow().output).into_owned();
        (output, game)
    }

    #[test]
    fn test_walk_into_johanna_and_ace_the_quiz() {
        let (output, game) = play(
            "#go n\n#go n\n#go w\n#go w\n42\n108\n13\n15 CM2\n11,25\n#status\n#go e\n#go w\n#quit\n",
        );
        assert!(output.contains("Du har anlänt till ett rum!"));
        assert!(output.contains("kul för dig +15 coins"));
        assert!(output.contains("  Coins: 20"));
        assert_eq!(game.session().status().defeated, 1);
        assert_eq!(game.session().quiz_attempts(), 1);
        // The retired room does not fire again.
        assert_eq!(output.matches("Du har anlänt till ett rum!").count(), 1);
        assert!(game.is_finished());
    }

    #[test]
    fn test_wrong_answer_leads_to_combat() {
        let (output, game) = play("#challenge johanna\n42\nvet ej\nattack träsvärd\n#status\n");
        assert!(output.contains("Fel! Nu ska vi slåss!"));
        assert!(output.contains("You attack with träsvärd and deal 10 damage!"));
        assert!(output.contains("Johanna attacks and deals 1 damage!"));
        assert_eq!(game.session().encounters(), 1);
        // Input ran out mid-fight; the player stood still until it ended.
        assert!(game.session().is_over() || game.session().status().defeated == 1);
    }

    #[test]
    fn test_already_defeated_teacher() {
        let (output, _) = play(
            "#challenge ronja\nLondon\nWilliam Shakespeare\njoyful\ndecrease\nran\n#challenge Ronja\n#quit\n",
        );
        assert!(output.contains("Ronja är redan besegrad."));
    }

    #[tokio::test]
    async fn test_losing_to_lars_is_the_bad_ending() {
        let config = HeadlessConfig {
            json: true,
            ..HeadlessConfig::new("Tester")
        };
        let (output, game) = play_with(config, "#challenge lars\n3\n3\n3\n3\n3\n#status\n");
        assert!(output.contains("Lars steps up with 500/500 HP and regenerates!"));
        assert!(output.contains("[EVENT] {\"event\":\"game_over\""));
        assert!(output.contains("Bad ending"));
        assert!(game.session().is_over());
        assert!(game.is_finished());
        // The game stops reading after an ending.
        assert!(!output.contains("[STATUS]\n"));
    }

    #[test]
    fn test_lootbox_commands() {
        let (output, game) = play("#loot epic\n#loot normal\n#loot mythic\n#quit\n");
        assert!(output.contains("[ERROR] Need 15 coins but only have 5"));
        assert!(output.contains("Du har redan") || output.contains("Du fick kukri"));
        assert!(output.contains("unknown lootbox 'mythic'"));
        assert_eq!(game.session().player().coins(), 0);
    }

    #[test]
    fn test_bad_commands() {
        let (output, _) = play("hello\n#fly\n#go up-left\n#challenge rektorn\n");
        assert!(output.contains("[ERROR] Unknown input."));
        assert!(output.contains("[ERROR] Unknown command."));
        assert!(output.contains("unknown direction"));
        assert!(output.contains("Nobody called 'rektorn'"));
    }

    #[test]
    fn test_config_from_env_and_args() {
        let config = HeadlessConfig::from_lookup(|key| match key {
            "CLASH_PLAYER_NAME" => Some("Felix".to_string()),
            "CLASH_SEED" => Some("not a number".to_string()),
            "CLASH_REGEN_INTERVAL_MS" => Some("250".to_string()),
            _ => None,
        });
        assert_eq!(config.player_name, "Felix");
        assert_eq!(config.seed, None);
        assert_eq!(config.regen_interval, Duration::from_millis(250));

        let args: Vec<String> = ["clash", "--seed", "7", "--json", "--name", "Elliot"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = parse_config_from_args(&args, config);
        assert_eq!(config.seed, Some(7));
        assert!(config.json);
        assert_eq!(config.player_name, "Elliot");
    }
}
