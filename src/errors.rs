use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenParseError {
    #[error("expected at least 4 whitespace-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid character '{0}' in board field")]
    InvalidBoardChar(char),
    #[error("rank {0} does not describe exactly 8 files")]
    BadRankLength(u8),
    #[error("board field does not describe exactly 8 ranks")]
    BadRankCount,
    #[error("invalid side to move \"{0}\"")]
    InvalidSideToMove(String),
    #[error("invalid castling rights \"{0}\"")]
    InvalidCastlingRights(String),
    #[error("invalid en passant square \"{0}\"")]
    InvalidEnPassant(String),
    #[error("invalid halfmove clock \"{0}\"")]
    InvalidHalfmoveClock(String),
    #[error("invalid fullmove number \"{0}\"")]
    InvalidFullmoveNumber(String),
    #[error("position has {0} kings for one side")]
    WrongKingCount(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("invalid move length {0}")]
    InvalidLength(usize),
    #[error("invalid from-square \"{0}\"")]
    InvalidFromSquare(String),
    #[error("invalid to-square \"{0}\"")]
    InvalidToSquare(String),
    #[error("invalid promotion piece '{0}'")]
    InvalidPromotionPiece(char),
    #[error("move {0} is not legal in this position")]
    IllegalMove(String),
}
