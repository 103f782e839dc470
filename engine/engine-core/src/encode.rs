//! Boundary between game states and a learned model's input layer.

/// Turns a game state into a fixed-length feature vector.
///
/// The length must not depend on the state: it is the model's input width.
pub trait FeatureEncoder<S> {
    /// Number of features `encode` produces.
    fn feature_size(&self) -> usize;

    /// Append exactly `feature_size()` features for `state` to `out`.
    fn encode_into(&self, state: &S, out: &mut Vec<f32>);

    /// Convenience wrapper returning a fresh vector.
    fn encode(&self, state: &S) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.feature_size());
        self.encode_into(state, &mut out);
        out
    }
}
