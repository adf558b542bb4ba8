//! Prime capacity normalization shared by both tables.

/// Returns `true` if `n` is prime. Trial division by odd factors up to `√n`.
pub fn is_prime(n: usize) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }
    let mut factor = 3;
    while factor * factor <= n {
        if n % factor == 0 {
            return false;
        }
        factor += 2;
    }
    true
}

/// Smallest prime reachable from `n` by first forcing it odd and then
/// stepping upward by two. An even request of 2 therefore yields 3.
pub fn next_prime(n: usize) -> usize {
    let mut candidate = if n % 2 == 0 { n + 1 } else { n };
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

/// Capacity actually used for a requested size: unchanged if already prime.
pub(crate) fn normalize(n: usize) -> usize {
    if is_prime(n) {
        n
    } else {
        next_prime(n)
    }
}
