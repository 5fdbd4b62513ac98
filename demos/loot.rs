use std::collections::HashMap;

use weightedbag::{BadWeightPolicy, WeightedEnum, WeightedSampler};

#[derive(Copy, Eq, PartialEq, Clone, Debug, Hash, WeightedEnum)]
enum Rarity {
    #[weight(1)]
    Mythic,
    #[weight(10)]
    Legendary,
    #[weight(200)]
    Uncommon,
    #[weight(789)]
    Common,
}

fn histogram<T: Copy + Eq + std::hash::Hash>(
    sampler: &mut WeightedSampler<T>,
    draws: usize,
) -> Vec<(T, u64)> {
    let mut hist: HashMap<T, u64> = HashMap::new();
    for _ in 0..draws {
        if let Some(&x) = sampler.sample() {
            *hist.entry(x).or_default() += 1;
        }
    }
    let mut v: Vec<_> = hist.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1));
    v
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rarity = Rarity::sampler()?;
    println!("Rarity (1M rolls):");
    for (r, c) in histogram(&mut rarity, 1_000_000) {
        println!("{c:>8} {r:?}");
    }

    // Event weekend: flat boost for everything, then pull Common back down.
    rarity.add_weight_to_all(50)?;
    rarity.set_weight(&Rarity::Common, 400)?;
    println!("\nEvent rarity (1M rolls):");
    for (r, c) in histogram(&mut rarity, 1_000_000) {
        println!("{c:>8} {r:?}");
    }

    let mut shop: WeightedSampler<&str> =
        WeightedSampler::from_pairs([("potion", 40), ("scroll", 25), ("ether", 10)])?;
    shop.add("bomb", 0)?; // clamped to 1 under the default policy
    println!("\n{shop}");

    shop.set_policy(BadWeightPolicy::ThrowOnAdd);
    if let Err(e) = shop.subtract_weight_from_all(10) {
        println!("rejected: {e}");
    }
    shop.remove(&"bomb")?;
    println!("{shop}");

    Ok(())
}
