/// Consumer of a ranked category listing, for display only.
pub trait ResultPresenter {
    /// Present `ranked` (already ordered best-first) under `label`.
    fn present(&self, ranked: &[(String, u64)], label: &str);
}
