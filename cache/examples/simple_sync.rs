use kestrel_cache::{CacheBuilder, ItemOptions, PolicyKind};
use std::thread;
use std::time::Duration;

fn main() {
  // An LRU cache of 100 items whose janitor sweeps once a second.
  let cache = CacheBuilder::<String, u64>::new()
    .policy(PolicyKind::Lru)
    .capacity(100)
    .janitor_interval(Duration::from_secs(1))
    .build_number()
    .expect("Failed to build cache");

  println!("Inserting ('session', 100) with a 2-second TTL.");
  cache.set_with(
    "session".to_string(),
    100,
    ItemOptions::new().with_expiration(Duration::from_secs(2)),
  );

  for _ in 0..3 {
    cache.increment("visits".to_string(), 1);
  }
  println!("visits = {}", cache.get(&"visits".to_string()).unwrap_or_default());

  match cache.get(&"session".to_string()) {
    Some(value) => println!("Found value for session: {}", value),
    None => println!("Value for session not found."),
  }
  println!("Keys: {:?}", cache.keys());

  println!("\nWaiting for 3 seconds for the item to expire...");
  thread::sleep(Duration::from_secs(3));

  // The janitor will have removed the expired item by now.
  println!("Keys after expiration: {:?}", cache.keys());

  cache.stop_janitor();
}
