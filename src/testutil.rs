use crate::board::FixedBoard;

pub(crate) type Board5 = FixedBoard<5, 5>;

pub(crate) fn sample_5x5() -> Board5 {
    FixedBoard::from_rows([
        [0, 1, 2, 3, 4],
        [5, 6, 7, 0, 1],
        [2, 3, 4, 5, 6],
        [7, 0, 1, 2, 3],
        [4, 5, 6, 7, 0],
    ])
}
