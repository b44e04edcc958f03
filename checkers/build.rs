use std::path::Path;
use std::{env, io};

mod neighbors {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use owlcheckers_base::types::{Square, DIAGONALS};

    const NONE: u8 = 0xff;

    fn generate_scaled(n: i8) -> [[u8; 4]; Square::PLAYABLE] {
        let mut res = [[NONE; 4]; Square::PLAYABLE];
        for sq in Square::iter_playable() {
            for (dir, delta) in DIAGONALS.iter().enumerate() {
                if let Some(dst) = sq.translate(delta.scaled(n)) {
                    res[sq.index()][dir] = dst.index() as u8;
                }
            }
        }
        res
    }

    fn print_table<W: Write>(
        w: &mut W,
        name: &str,
        table: &[[u8; 4]; Square::PLAYABLE],
    ) -> io::Result<()> {
        writeln!(w, "const {}: [[u8; 4]; 32] = [", name)?;
        for (i, row) in table.iter().enumerate() {
            write!(w, "    /*{:2}*/ [", i)?;
            for (j, val) in row.iter().enumerate() {
                if j != 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{:#04x}", val)?;
            }
            writeln!(w, "],")?;
        }
        writeln!(w, "];")?;
        Ok(())
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);
        print_table(&mut w, "STEPS", &generate_scaled(1))?;
        writeln!(&mut w)?;
        print_table(&mut w, "JUMPS", &generate_scaled(2))?;
        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    neighbors::gen(&Path::new(&out_dir).join("neighbors.rs"))?;

    Ok(())
}
