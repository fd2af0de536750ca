use criterion::criterion_main;


criterion_main!(batch::benches, incremental::benches);
