//! Narrative script for the prologue run.
//!
//! Scene policy (timing, cues, backdrops) lives in the scene table in
//! `model.rs`; this module only holds the words.

pub const TITLE: &str = "The Tangled Kingdom of Wardrobe";

pub const START_HINT: &str = "Press Enter to begin the story";

pub const START_AUDIO_NOTE: &str = "Sound cues play from here on";

pub const BEAT1_TEXT: &str = "Long ago, the Kingdom of Wardrobe was a realm of harmony and grace.\nEvery garment and trinket knew its place as if by magic, and the kingdom shone.";

pub const BEAT2_TEXT: &str = "Then one day the Curse of Chaos crept over the land.\nShelves fell into disarray, garments tangled into labyrinths, and the old order crumbled into silence.";

pub const DIALOGUE_SPEAKER: &str = "The Herd Fairy";

pub const DIALOGUE_TEXT: &str = "Brave one, this task falls to you alone.\nBring order back to the scattered kingdom and recover its lost beauty.\nIn every dungeon a wicked boss lies in wait.\nThe Odd Sock Slime, the dread Rebound Dragon... strike them down, and the Kingdom of Wardrobe will know peace and light once more!";

pub const FINALE_TITLE: &str = "The Adventure Begins";

pub const FINALE_TEXT: &str = "From here you will choose a calling of your own: sword-hand of decluttering, mage of spatial design, or alchemist of spare minutes.\nSmall quests come first, and every one you finish makes you stronger.\nWhen the kingdom gleams again, you will take the throne as its rightful ruler.\n\nNow, off you go!";

pub const COMPLETE_TITLE: &str = "Prologue Complete";

pub const COMPLETE_HINT: &str = "Press Enter to prepare for the adventure";

pub const BGM_SOURCE: &str = "sounds/prologue.ogg";
