use rand::Rng;
use rand::seq::SliceRandom;

/// Build the answer set for a round: the real title plus every decoy,
/// deduplicated, in uniformly random order (Fisher-Yates via `shuffle`).
pub fn build_options<R: Rng + ?Sized>(
    title: &str,
    decoys: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(decoys.len() + 1);
    options.push(title.to_string());
    for decoy in decoys {
        if !options.iter().any(|o| o == decoy) {
            options.push(decoy.clone());
        }
    }

    options.shuffle(rng);
    options
}
