//! Console output - board, move results and search reports on stdout

use wargame_core::{
    GameObserver, GameOptions, GameState, IllegalMove, Move, Outcome, Player, SearchResult,
    SearchStats,
};

/// Prints the game as it unfolds
pub struct Console {
    options: GameOptions,
}

impl Console {
    pub fn new(options: &GameOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    /// Who is moving for `player`, as shown before each move result
    fn controller(&self, player: Player) -> &'static str {
        if self.options.game_type.is_computer(player) {
            "Computer"
        } else if self.options.broker.is_some() {
            "Broker"
        } else {
            "Player"
        }
    }
}

impl GameObserver for Console {
    fn move_applied(&mut self, player: Player, outcome: &Outcome) {
        println!("{} {}: {}", self.controller(player), player, outcome);
    }

    fn move_rejected(&mut self, _player: Player, _mv: Move, reason: &IllegalMove) {
        println!("The move is not valid! Try again. ({})", reason);
    }

    fn search_completed(&mut self, _player: Player, result: &SearchResult, stats: &SearchStats) {
        print!("{}", search_report(result, stats));
    }

    fn turn_advanced(&mut self, state: &GameState) {
        println!();
        print!("{}", state);
    }

    fn game_over(&mut self, winner: Player, turns: u32) {
        println!("{} wins in {} turns", winner, turns);
    }
}

/// Multi-line report printed after each computer search
pub fn search_report(result: &SearchResult, stats: &SearchStats) -> String {
    let per_depth: Vec<String> = stats
        .evaluations_per_depth
        .iter()
        .map(|(depth, count)| format!("{}:{}", depth, count))
        .collect();

    let mut report = format!(
        "Heuristic score: {}\nAverage recursive depth: {:.1}\nEvals per depth: {}\nCumulative evals: {}\n",
        result.score,
        result.average_depth,
        per_depth.join(" "),
        stats.total_evaluations()
    );
    if let Some(rate) = stats.throughput() {
        report.push_str(&format!("Eval perf.: {:.1}k/s\n", rate / 1000.0));
    }
    report.push_str(&format!("Elapsed time: {:.1}s\n", result.elapsed.as_secs_f64()));
    report
}
