//! Incremental board state: stones, groups, liberties and per-point legality.
//!
//! The board is a 1D array with a wall border (see [`crate::constants`]).
//! Every placement keeps three things up to date without rescanning the
//! whole board:
//!
//! - group membership, as a circular `next` list per group plus an eagerly
//!   updated `head` representative shared by all members,
//! - the liberty count of every group, stored once per group at its head,
//! - a two-bit legality mask for every empty point (forbidden for Black,
//!   forbidden for White), recomputed for each empty point whose neighbors
//!   changed color or liberty count.
//!
//! Boards are plain fixed-size arrays, so cloning one per simulation is a
//! single memcpy.

use std::fmt;

use thiserror::Error;

use crate::constants::{BOARDSIZE, DELTA, N, W};

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// Contents of a board point.
///
/// The discriminants double as legality mask bits: a point is forbidden for
/// a color when `mask & color as u8 != 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Stone {
    Empty = 0b00,
    Black = 0b01,
    White = 0b10,
    Wall = 0b11,
}

impl Stone {
    /// The other player. `Empty` and `Wall` map to themselves.
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            other => other,
        }
    }

    #[inline]
    fn is_player(self) -> bool {
        matches!(self, Stone::Black | Stone::White)
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stone::Empty => "empty",
            Stone::Black => "black",
            Stone::White => "white",
            Stone::Wall => "wall",
        };
        f.write_str(name)
    }
}

/// Which placements the board accepts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Rules {
    /// Go-style: a placement that takes an opposing group's last liberty
    /// removes that group. Suicide is forbidden.
    #[default]
    Capture,
    /// NoGo: taking an opposing group's last liberty is forbidden, as is
    /// suicide. Stones never leave the board.
    NoCapture,
}

const FORBID_BOTH: u8 = 0b11;

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("point is off the board")]
    OffBoard,
    #[error("point is not empty")]
    Occupied,
    #[error("placement is forbidden for {0}")]
    Forbidden(Stone),
    #[error("{0} cannot be placed")]
    NotAPlayer(Stone),
}

/// Board state.
#[derive(Clone)]
pub struct Board {
    rules: Rules,
    stones: [Stone; BOARDSIZE],
    /// Legality mask; occupied and wall points are forbidden for both colors.
    forbid: [u8; BOARDSIZE],
    /// Circular list linking the members of each group.
    next: [Point; BOARDSIZE],
    /// Group representative, identical for every member.
    head: [Point; BOARDSIZE],
    /// Liberty count, valid at group heads only.
    libs: [u16; BOARDSIZE],
    /// Stone count, valid at group heads only.
    size: [u16; BOARDSIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl Board {
    /// Create an empty board.
    pub fn new(rules: Rules) -> Self {
        let mut board = Board {
            rules,
            stones: [Stone::Wall; BOARDSIZE],
            forbid: [FORBID_BOTH; BOARDSIZE],
            next: std::array::from_fn(|i| i),
            head: std::array::from_fn(|i| i),
            libs: [0; BOARDSIZE],
            size: [0; BOARDSIZE],
        };
        for pt in all_points() {
            board.stones[pt] = Stone::Empty;
            board.forbid[pt] = 0;
        }
        board
    }

    #[inline]
    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Contents of a point. Out-of-range indices read as walls.
    #[inline]
    pub fn stone(&self, pt: Point) -> Stone {
        self.stones.get(pt).copied().unwrap_or(Stone::Wall)
    }

    /// Liberty count of the group containing `pt`, or 0 for a non-stone.
    #[inline]
    pub fn liberties(&self, pt: Point) -> usize {
        if self.stone(pt).is_player() {
            self.libs[self.head[pt]] as usize
        } else {
            0
        }
    }

    /// Representative point of the group containing `pt`.
    #[inline]
    pub fn group_head(&self, pt: Point) -> Point {
        self.head[pt]
    }

    /// All stones of the group containing `pt`, in list order.
    pub fn group_stones(&self, pt: Point) -> Vec<Point> {
        if !self.stone(pt).is_player() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.size[self.head[pt]] as usize);
        let mut cur = pt;
        loop {
            out.push(cur);
            cur = self.next[cur];
            if cur == pt {
                break;
            }
        }
        out
    }

    /// Whether `color` may not be placed at `pt`.
    #[inline]
    pub fn is_forbidden(&self, pt: Point, color: Stone) -> bool {
        match self.forbid.get(pt) {
            Some(mask) => mask & color as u8 != 0,
            None => true,
        }
    }

    /// Number of stones of the given color on the board.
    pub fn stone_count(&self, color: Stone) -> usize {
        all_points().filter(|&pt| self.stones[pt] == color).count()
    }

    /// Place a stone, returning `false` (and leaving the board untouched)
    /// if the placement is illegal.
    #[inline]
    pub fn place(&mut self, pt: Point, color: Stone) -> bool {
        self.play(pt, color).is_ok()
    }

    /// Place a stone and return the number of opposing stones captured.
    ///
    /// # Errors
    /// - [`MoveError::OffBoard`] for wall points and out-of-range indices
    /// - [`MoveError::Occupied`] if a stone is already there
    /// - [`MoveError::Forbidden`] if the legality mask forbids `color`
    /// - [`MoveError::NotAPlayer`] if `color` is `Empty` or `Wall`
    pub fn play(&mut self, pt: Point, color: Stone) -> Result<usize, MoveError> {
        if !color.is_player() {
            return Err(MoveError::NotAPlayer(color));
        }
        match self.stone(pt) {
            Stone::Wall => return Err(MoveError::OffBoard),
            Stone::Empty => {}
            _ => return Err(MoveError::Occupied),
        }
        if self.is_forbidden(pt, color) {
            return Err(MoveError::Forbidden(color));
        }

        self.stones[pt] = color;
        self.forbid[pt] = FORBID_BOTH;
        self.next[pt] = pt;
        self.head[pt] = pt;
        self.size[pt] = 1;

        let opp = color.opponent();
        let mut own = [0; 4];
        let mut n_own = 0;
        let mut enemy = [0; 4];
        let mut n_enemy = 0;
        for n in neighbors(pt) {
            let h = self.head[n];
            if self.stones[n] == color && !own[..n_own].contains(&h) {
                own[n_own] = h;
                n_own += 1;
            } else if self.stones[n] == opp && !enemy[..n_enemy].contains(&h) {
                enemy[n_enemy] = h;
                n_enemy += 1;
            }
        }

        let mut group = pt;
        for &h in &own[..n_own] {
            group = self.merge(group, h);
        }
        self.count_liberties(group);

        let mut touched = vec![group];
        let mut captured = Vec::new();
        for &h in &enemy[..n_enemy] {
            self.count_liberties(h);
            if self.libs[h] == 0 {
                self.remove_group(h, &mut captured);
            } else {
                touched.push(h);
            }
        }

        if !captured.is_empty() {
            // Only `color` groups can border the removed stones.
            for &c in &captured {
                for n in neighbors(c) {
                    if self.stones[n] == color && !touched.contains(&self.head[n]) {
                        touched.push(self.head[n]);
                    }
                }
            }
            for &h in &touched {
                if self.stones[h] == color {
                    self.count_liberties(h);
                }
            }
        }
        debug_assert!(self.libs[self.head[pt]] > 0, "placement left its group without liberties");

        let mut refreshed = [false; BOARDSIZE];
        for &h in &touched {
            self.refresh_around(h, &mut refreshed);
        }
        for &c in &captured {
            self.refresh_point(c, &mut refreshed);
            for n in neighbors(c) {
                self.refresh_point(n, &mut refreshed);
            }
        }

        Ok(captured.len())
    }

    /// Every point where `color` may be placed, in row-major order.
    pub fn valid_places(&self, color: Stone) -> Vec<Point> {
        all_points().filter(|&pt| !self.is_forbidden(pt, color)).collect()
    }

    /// Number of points where `color` may be placed.
    pub fn valid_place_count(&self, color: Stone) -> usize {
        all_points().filter(|&pt| !self.is_forbidden(pt, color)).count()
    }

    /// Count "bowls" for `color`: empty points with exactly three neighbors
    /// that are walls or `color` stones and exactly one empty neighbor.
    pub fn bowl_count(&self, color: Stone) -> usize {
        all_points()
            .filter(|&pt| self.stones[pt] == Stone::Empty)
            .filter(|&pt| {
                let mut closed = 0;
                let mut open = 0;
                for n in neighbors(pt) {
                    match self.stones[n] {
                        Stone::Empty => open += 1,
                        Stone::Wall => closed += 1,
                        c if c == color => closed += 1,
                        _ => return false,
                    }
                }
                closed == 3 && open == 1
            })
            .count()
    }

    /// Join two groups and return the surviving head. Members of the smaller
    /// group are relabelled immediately.
    fn merge(&mut self, a: Point, b: Point) -> Point {
        let (keep, gone) = if self.size[a] >= self.size[b] { (a, b) } else { (b, a) };
        let mut cur = gone;
        loop {
            self.head[cur] = keep;
            cur = self.next[cur];
            if cur == gone {
                break;
            }
        }
        self.next.swap(keep, gone);
        self.size[keep] += self.size[gone];
        keep
    }

    /// Recount the liberties of the group headed by `h` from its members.
    fn count_liberties(&mut self, h: Point) {
        let mut seen = [false; BOARDSIZE];
        let mut count = 0;
        let mut cur = h;
        loop {
            for n in neighbors(cur) {
                if self.stones[n] == Stone::Empty && !seen[n] {
                    seen[n] = true;
                    count += 1;
                }
            }
            cur = self.next[cur];
            if cur == h {
                break;
            }
        }
        self.libs[h] = count;
    }

    /// Take a group off the board, appending its points to `out`.
    fn remove_group(&mut self, h: Point, out: &mut Vec<Point>) {
        let start = out.len();
        let mut cur = h;
        loop {
            out.push(cur);
            cur = self.next[cur];
            if cur == h {
                break;
            }
        }
        for &pt in &out[start..] {
            self.stones[pt] = Stone::Empty;
            self.forbid[pt] = 0;
            self.next[pt] = pt;
            self.head[pt] = pt;
            self.libs[pt] = 0;
            self.size[pt] = 0;
        }
    }

    /// Recompute the legality of every empty point next to the group headed by `h`.
    fn refresh_around(&mut self, h: Point, refreshed: &mut [bool; BOARDSIZE]) {
        let mut cur = h;
        loop {
            for n in neighbors(cur) {
                self.refresh_point(n, refreshed);
            }
            cur = self.next[cur];
            if cur == h {
                break;
            }
        }
    }

    #[inline]
    fn refresh_point(&mut self, pt: Point, refreshed: &mut [bool; BOARDSIZE]) {
        if self.stones[pt] == Stone::Empty && !refreshed[pt] {
            refreshed[pt] = true;
            self.update_empty(pt);
        }
    }

    fn update_empty(&mut self, pt: Point) {
        let mut mask = 0;
        for color in [Stone::Black, Stone::White] {
            if self.placement_forbidden(pt, color) {
                mask |= color as u8;
            }
        }
        self.forbid[pt] = mask;
    }

    /// Legality of `color` at the empty point `pt`, from the current neighbors.
    fn placement_forbidden(&self, pt: Point, color: Stone) -> bool {
        let opp = color.opponent();
        let mut has_liberty = false;
        let mut joins_safely = false;
        let mut captures = false;
        for n in neighbors(pt) {
            let c = self.stones[n];
            if c == Stone::Empty {
                has_liberty = true;
            } else if c == color {
                joins_safely |= self.libs[self.head[n]] >= 2;
            } else if c == opp {
                captures |= self.libs[self.head[n]] <= 1;
            }
        }
        match self.rules {
            Rules::Capture => !(has_liberty || joins_safely || captures),
            // An opponent's eye has no liberty and no own neighbor, so it
            // falls under the suicide test as well.
            Rules::NoCapture => captures || !(has_liberty || joins_safely),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..N {
            for x in 0..N {
                let ch = match self.stones[point(x, y)] {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})\n{self}", self.rules)
    }
}

/// Board index of the 0-based coordinate `(x, y)`.
#[inline]
pub fn point(x: usize, y: usize) -> Point {
    (x + 1) + (y + 1) * W
}

/// 0-based `(x, y)` of a playable point.
#[inline]
pub fn coords(pt: Point) -> (usize, usize) {
    (pt % W - 1, pt / W - 1)
}

/// Board index of `(x, y)` if it is on the board.
pub fn checked_point(x: i32, y: i32) -> Option<Point> {
    let range = 0..N as i32;
    (range.contains(&x) && range.contains(&y)).then(|| point(x as usize, y as usize))
}

/// Every playable point in row-major order.
pub fn all_points() -> impl Iterator<Item = Point> {
    (0..N).flat_map(|y| (0..N).map(move |x| point(x, y)))
}

/// The 4 orthogonal neighbors of a point.
#[inline]
pub fn neighbors(pt: Point) -> [Point; 4] {
    [
        (pt as isize + DELTA[0]) as usize,
        (pt as isize + DELTA[1]) as usize,
        (pt as isize + DELTA[2]) as usize,
        (pt as isize + DELTA[3]) as usize,
    ]
}

/// Convert a point to a Go-style coordinate string (e.g. "D4").
///
/// Columns use letters A-T skipping I; row 1 is the bottom row (`y == N - 1`).
pub fn str_coord(pt: Point) -> String {
    let (x, y) = coords(pt);
    let mut c = (b'A' + x as u8) as char;
    if c >= 'I' {
        c = (c as u8 + 1) as char;
    }
    format!("{c}{}", N - y)
}

/// Parse a Go-style coordinate string. Returns `None` for anything off the board.
pub fn parse_coord(s: &str) -> Option<Point> {
    let bytes = s.as_bytes();
    let (&col_char, digits) = bytes.split_first()?;
    let col_char = col_char.to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut x = (col_char - b'A') as usize;
    if col_char > b'I' {
        x -= 1;
    }
    let row: usize = std::str::from_utf8(digits).ok()?.parse().ok()?;
    if x >= N || row == 0 || row > N {
        return None;
    }
    Some(point(x, N - row))
}
