// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bloomcheck::bloom::BloomFilter;

fn main() {
    println!("=== Bloom Filter Example ===\n");

    // Example 1: Optimal parameters
    println!("1. Filter sized for 1000 names at 1% FPR:");
    let mut filter = BloomFilter::new_optimal(1000, 0.01).unwrap();
    println!("   Size: {} bits", filter.size());
    println!("   Hash functions: {}", filter.hash_count());

    for i in 0..1000 {
        filter.insert(format!("logs/app_{}.log", i));
    }
    println!("   Bit density: {:.4}", filter.density());
    println!(
        "   Estimated FPR: {:.4}%",
        filter.estimate_false_positive_rate(1000) * 100.0
    );
    println!();

    // Example 2: Queries
    println!("2. Queries:");
    for name in ["logs/app_42.log", "logs/app_4242.log", "README.md"] {
        let verdict = if filter.might_contain(name) {
            "possibly present"
        } else {
            "definitely absent"
        };
        println!("   {}: {}", name, verdict);
    }
    println!();

    // Example 3: Persisted image
    println!("3. Serialize and deserialize:");
    let bytes = filter.serialize();
    println!("   Serialized size: {} bytes", bytes.len());
    let restored = BloomFilter::deserialize(&bytes).unwrap();
    println!("   Identical after round trip: {}", restored == filter);
    println!();

    // Example 4: Tiny filter, bit by bit
    println!("4. An 8-bit filter with 3 hash functions:");
    let mut tiny = BloomFilter::new(8, 3).unwrap();
    println!("   Before insert(\"a\"): {}", tiny);
    tiny.insert("a");
    println!("   After insert(\"a\"):  {}", tiny);
    tiny.clear();
    println!("   After clear():      {}", tiny);
}
