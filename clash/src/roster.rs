//! The cast: six teachers with their quiz banks, and Lars.

use clash_core::{Opponent, QuestionBank};
use std::time::Duration;

/// One opponent as placed in the school.
#[derive(Debug)]
pub struct RosterEntry {
    /// Single-letter map code.
    pub code: char,
    pub subject: &'static str,
    /// Line the opponent opens with.
    pub greeting: &'static str,
    /// Said after a perfect quiz.
    pub praise: &'static str,
    pub opponent: Opponent,
    /// `None` for the boss, who skips straight to the fight.
    pub bank: Option<QuestionBank>,
}

#[derive(Debug)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// The standard school. `regen_interval` paces the boss.
    pub fn standard(regen_interval: Duration) -> Self {
        let entries = vec![
            teacher(
                'J',
                "Matte",
                Opponent::scripted("Johanna", 100, 1, 10),
                "Hur bra är du på matte då?",
                "Du va bra på matte, kul för dig",
                &[
                    ("Vad är 15 + 27?", "42"),
                    ("Vad är 12 × 9?", "108"),
                    ("Lös ekvationen: ? + 7 = 20", "13"),
                    ("Vad är arean av en rektangel med längd 5 cm och bredd 3 cm?", "15 cm2"),
                    ("Vad är medelvärdet av 5, 8, 12 och 20?", "11,25"),
                ],
            ),
            teacher(
                'R',
                "English",
                Opponent::scripted("Ronja", 110, 5, 15),
                "How good are you in English?",
                "Wow, your English is impressive. Move on",
                &[
                    ("What is the capital of the United Kingdom?", "London"),
                    ("Who wrote the play 'Romeo and Juliet'?", "William Shakespeare"),
                    ("Which word is a synonym for 'happy'?", "joyful"),
                    ("What is the opposite of 'increase'?", "decrease"),
                    ("What is the past tense of 'run'?", "ran"),
                ],
            ),
            teacher(
                'H',
                "Fysik",
                Opponent::scripted("Henrik", 125, 8, 18),
                "Hur bra är du på fysik?",
                "Bra jobbat med fysiken!",
                &[
                    ("Är solen en stjärna? (ja/nej)", "ja"),
                    ("Är ljus snabbare än ljud? (ja/nej)", "ja"),
                    ("Är jordens gravitation konstant? (ja/nej)", "nej"),
                    ("Är en Newton en enhet för kraft? (ja/nej)", "ja"),
                    ("Är vatten en bra ledare för elektricitet? (ja/nej)", "ja"),
                ],
            ),
            teacher(
                'V',
                "Logik",
                Opponent::scripted("Victor", 135, 1, 13),
                "Kan du lösa mina logiska mattefrågor?",
                "Imponerande logik, bra gjort!",
                &[
                    ("Vad är 2, 4, 8, 16, ?", "32"),
                    ("Vad blir 10% av 200?", "20"),
                    ("Vad är nästa tal i serien: 1, 1, 2, 3, 5, ?", "8"),
                    ("Vad är 5^2?", "25"),
                    ("Om ett pris ökar med 10%, vad blir priset från 100 kr?", "110"),
                ],
            ),
            teacher(
                'D',
                "Idrott",
                Opponent::scripted("David", 150, 9, 20),
                "Hur bra är du på idrott?",
                "Idrottssinne: check! Bra jobbat.",
                &[
                    ("Hur många spelare finns i ett fotbollslag?", "11"),
                    ("Hur lång är en standard maratonlopp (i km)?", "42,195"),
                    ("Hur många minuter är en ishockeymatch?", "60"),
                    ("Vad kallas ett resultat på noll i tennis?", "love"),
                    ("Hur många passagerare kan en bil oftast rymma?", "5"),
                ],
            ),
            teacher(
                'M',
                "Datorer",
                Opponent::scripted("Mirrela", 200, 11, 25),
                "Hur bra är du på datorer och nätverk?",
                "Du kan dina datorer! Bra jobbat.",
                &[
                    ("Är CPU datorns hjärna? (ja/nej)", "ja"),
                    ("Kan du surfa utan webbläsare? (ja/nej)", "nej"),
                    ("Är en hårddisk till för lagring? (ja/nej)", "ja"),
                    ("Är USB ett sätt att överföra data? (ja/nej)", "ja"),
                    ("Kan antivirusprogram vara gratis? (ja/nej)", "ja"),
                ],
            ),
            RosterEntry {
                code: 'L',
                subject: "Boss",
                greeting: "Du möter Lars, final boss. Nu ska vi slåss!",
                praise: "",
                opponent: Opponent::regenerating("Lars", 500, 20, 50, 20)
                    .with_regen_interval(regen_interval),
                bank: None,
            },
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Look up an opponent by name, ignoring case.
    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut RosterEntry> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter_mut()
            .find(|e| e.opponent.name().to_lowercase() == wanted)
    }

    pub fn by_code_mut(&mut self, code: char) -> Option<&mut RosterEntry> {
        self.entries.iter_mut().find(|e| e.code == code)
    }

    pub fn boss(&self) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.bank.is_none())
    }
}

fn teacher(
    code: char,
    subject: &'static str,
    opponent: Opponent,
    greeting: &'static str,
    praise: &'static str,
    questions: &[(&str, &str)],
) -> RosterEntry {
    RosterEntry {
        code,
        subject,
        greeting,
        praise,
        opponent,
        bank: Some(QuestionBank::from_pairs(questions.iter().copied())),
    }
}
