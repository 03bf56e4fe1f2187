use rand::seq::SliceRandom;

/// Avatars assigned to new masters.
const AVATARS: &[&str] = &[
    "/masters/amy-burns.png",
    "/masters/balazs-orban.png",
    "/masters/delba-de-oliveira.png",
    "/masters/evil-rabbit.png",
    "/masters/lee-robinson.png",
    "/masters/michael-novotny.png",
];

/// Pick an avatar at random.
pub fn pick() -> &'static str {
    AVATARS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(AVATARS[0])
}
