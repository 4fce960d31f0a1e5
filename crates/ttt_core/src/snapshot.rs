//! Wire form of a board.

use crate::board::{Piece, DEFAULT_SIDE_LENGTH};
use serde::{Deserialize, Serialize};

/// The shared part of a [`Board`](crate::Board) as carried in a `board`
/// message.
///
/// ```json
/// {"dimension": 2, "side_length": 3, "pieces": [0, null, 1, ...], "cur_piece": 0}
/// ```
///
/// `dimension` is the literal rank. `side_length` may be omitted and defaults
/// to 3. Values are not validated here; [`Board::deserialize`](crate::Board::deserialize)
/// does that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub dimension: i64,
    #[serde(default = "default_side_length")]
    pub side_length: usize,
    pub pieces: Vec<Option<Piece>>,
    pub cur_piece: Piece,
}

fn default_side_length() -> usize {
    DEFAULT_SIDE_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let state = BoardState {
            dimension: 2,
            side_length: 3,
            pieces: vec![Some(Piece::First), None, Some(Piece::Second), None, None, None, None, None, None],
            cur_piece: Piece::First,
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "dimension": 2,
                "side_length": 3,
                "pieces": [0, null, 1, null, null, null, null, null, null],
                "cur_piece": 0
            })
        );
    }

    #[test]
    fn test_side_length_defaults_to_three() {
        let state: BoardState =
            serde_json::from_value(json!({"dimension": 2, "pieces": [], "cur_piece": 1})).unwrap();
        assert_eq!(state.side_length, 3);
        assert_eq!(state.cur_piece, Piece::Second);
    }

    #[test]
    fn test_rejects_unknown_piece_values() {
        let result: Result<BoardState, _> =
            serde_json::from_value(json!({"dimension": 2, "pieces": [2], "cur_piece": 0}));
        assert!(result.is_err());
        let result: Result<BoardState, _> =
            serde_json::from_value(json!({"dimension": 2, "pieces": [], "cur_piece": 3}));
        assert!(result.is_err());
    }
}
