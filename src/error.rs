use thiserror::Error;

/// Errors raised while setting up a game. All of them are detected before a
/// session starts; scoring itself never fails.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("letter pool is empty")]
    EmptyPool,

    #[error("letter {0} appears more than once in the pool")]
    DuplicateLetter(String),

    #[error("{difficulty} needs {needed} letters but the pool only has {available}")]
    NotEnoughLetters {
        difficulty: String,
        needed: usize,
        available: usize,
    },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("letter data not found: {0}")]
    MissingLetterData(String),

    #[error("invalid letter data: {0}")]
    LetterData(#[from] serde_json::Error),
}

/// Failures of the text-to-speech collaborator. These are logged and never
/// surface to the player.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("speech command is empty")]
    NoCommand,

    #[error("failed to start speech command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
