use sample_project::add;

fn main() {
    println!("2 + 2 = {}", add(2, 2));
}
