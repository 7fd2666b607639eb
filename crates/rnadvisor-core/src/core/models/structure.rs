use nalgebra::Point3;

/// A single atom record read from a structure file.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name as written in the file (e.g., "P", "C4'", "N1").
    pub name: String,
    /// The element symbol, empty if the file does not provide one.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Read from a `HETATM` record.
    pub hetero: bool,
}

impl Atom {
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            hetero: false,
        }
    }

    /// Marks the atom as coming from a `HETATM` record.
    pub fn hetatm(mut self) -> Self {
        self.hetero = true;
        self
    }

    pub fn is_hydrogen(&self) -> bool {
        let symbol = if self.element.is_empty() {
            self.name.trim_start_matches(|c: char| c.is_ascii_digit())
        } else {
            self.element.as_str()
        };
        matches!(symbol.chars().next(), Some('H') | Some('D'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub chain_id: char,
    pub number: isize,
    pub insertion_code: char,
    pub name: String,
    atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(chain_id: char, number: isize, insertion_code: char, name: &str) -> Self {
        Self {
            chain_id,
            number,
            insertion_code,
            name: name.to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    pub(crate) fn push_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    /// One-letter nucleotide code, `X` for anything that is not a standard base.
    pub fn one_letter_code(&self) -> char {
        match self.name.trim() {
            "A" | "ADE" | "DA" | "RA" => 'A',
            "C" | "CYT" | "DC" | "RC" => 'C',
            "G" | "GUA" | "DG" | "RG" => 'G',
            "U" | "URA" | "URI" | "RU" => 'U',
            "T" | "THY" | "DT" => 'T',
            _ => 'X',
        }
    }

    /// Label in the `<chain><number>` form used by base-pair annotators.
    pub fn label(&self) -> String {
        if self.insertion_code == ' ' {
            format!("{}{}", self.chain_id, self.number)
        } else {
            format!("{}{}.{}", self.chain_id, self.number, self.insertion_code)
        }
    }
}

/// An ordered collection of residues, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    residues: Vec<Residue>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.residues.iter().flat_map(|r| r.atoms.iter())
    }

    pub fn atom_count(&self) -> usize {
        self.residues.iter().map(|r| r.atoms.len()).sum()
    }

    pub fn sequence(&self) -> String {
        self.residues.iter().map(Residue::one_letter_code).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Appends an atom, opening a new residue whenever the residue key changes.
    pub(crate) fn push_atom(
        &mut self,
        chain_id: char,
        number: isize,
        insertion_code: char,
        residue_name: &str,
        atom: Atom,
    ) {
        let starts_new = match self.residues.last() {
            Some(last) => {
                last.chain_id != chain_id
                    || last.number != number
                    || last.insertion_code != insertion_code
            }
            None => true,
        };
        if starts_new {
            self.residues
                .push(Residue::new(chain_id, number, insertion_code, residue_name));
        }
        if let Some(residue) = self.residues.last_mut() {
            residue.push_atom(atom);
        }
    }
}
