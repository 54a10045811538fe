use corpus_tally_core::presenter::ResultPresenter;

/// Prints a ranked listing as an aligned console table.
pub struct ConsolePresenter;

impl ResultPresenter for ConsolePresenter {
    fn present(&self, ranked: &[(String, u64)], label: &str) {
        println!("\n=== TOP {} ===", label);
        if ranked.is_empty() {
            println!("(no values)");
            return;
        }
        let width = ranked
            .iter()
            .map(|(value, _)| value.len())
            .max()
            .unwrap_or(0);
        for (position, (value, count)) in ranked.iter().enumerate() {
            println!("{:>2}. {:<width$}  {}", position + 1, value, count);
        }
    }
}
