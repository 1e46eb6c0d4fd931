use crate::{
    config::KeyFormat,
    tokenizer::{is_class_line, is_enum_marker, split_declaration},
    types::{DartClass, Field},
    utils::{count, includes_all, includes_one, includes_word, remove_end},
};
use tracing::debug;

/// Section of the declaration line the next word belongs to.
#[derive(Clone, Copy, PartialEq)]
enum Expect {
    Nothing,
    Name,
    Superclass,
    Mixins,
    Interfaces,
}

/// Scans Dart source into the classes it declares, in source order.
///
/// State classes (`extends State<...>`) are tracked for bookkeeping but not
/// returned. A class whose body never closes is returned without an end line,
/// which makes it invalid.
pub fn parse_classes(text: &str, key_format: KeyFormat) -> Vec<DartClass> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut classes = Vec::new();
    let mut current: Option<DartClass> = None;
    let mut curly_brackets = 0i32;
    let mut brackets = 0i32;
    let mut body_opened = false;
    let mut declaration = String::new();

    fn finish(clazz: DartClass, classes: &mut Vec<DartClass>) {
        if clazz.is_state() {
            debug!(class = %clazz.name, "skipping state class");
        } else {
            debug!(class = %clazz.name, start = ?clazz.starts_at_line, end = ?clazz.ends_at_line, "detected class");
            classes.push(clazz);
        }
    }

    for (i, &line) in lines.iter().enumerate() {
        let line_pos = i + 1;
        let class_line = is_class_line(line);

        if class_line {
            if let Some(unterminated) = current.take() {
                finish(unterminated, &mut classes);
            }
            let mut clazz = DartClass::new();
            clazz.starts_at_line = Some(line_pos);
            declaration = line.trim().to_string();
            read_declaration(&mut clazz, &declaration);
            current = Some(clazz);
            curly_brackets = 0;
            brackets = 0;
            body_opened = false;
        }

        let Some(clazz) = current.as_mut() else {
            continue;
        };

        // Declarations may wrap; keep reading them until the body opens.
        if !class_line && !body_opened {
            declaration.push(' ');
            declaration.push_str(line.trim());
            read_declaration(clazz, &declaration);
        }

        curly_brackets += count(line, '{') - count(line, '}');
        brackets += count(line, '(') - count(line, ')');
        // `class A {}` opens and closes on the same line.
        body_opened |= curly_brackets > 0 || count(line, '{') > 0;

        let includes_constr = line
            .replacen("const", "", 1)
            .trim_start()
            .starts_with(&format!("{}(", clazz.name));
        if includes_constr && !class_line && clazz.constr_starts_at_line.is_none() {
            clazz.constr_starts_at_line = Some(line_pos);
        }

        if clazz.constr_starts_at_line.is_some() && clazz.constr_ends_at_line.is_none() {
            let constr = clazz.constr.get_or_insert_with(String::new);
            constr.push_str(line);
            constr.push('\n');

            if brackets == 0 {
                clazz.constr_ends_at_line = Some(line_pos);
                constr.pop();
            }
        }

        clazz.class_content.push_str(line);
        if curly_brackets != 0 || !body_opened {
            clazz.class_content.push('\n');
        } else {
            clazz.ends_at_line = Some(line_pos);
            if let Some(done) = current.take() {
                finish(done, &mut classes);
            }
            continue;
        }

        if brackets == 0 && curly_brackets == 1 && is_field_line(line, clazz) {
            if let Some(mut field) = read_field(line, line_pos, key_format) {
                if i > 0 {
                    field.is_enum = is_enum_marker(lines[i - 1]);
                }
                clazz.properties.push(field);
            }
        }
    }

    if let Some(unterminated) = current.take() {
        finish(unterminated, &mut classes);
    }

    classes
}

/// Reads name, generics, superclass, mixins and interfaces off a class
/// declaration, replacing whatever was read before.
fn read_declaration(clazz: &mut DartClass, declaration: &str) {
    clazz.name.clear();
    clazz.modifiers.clear();
    clazz.full_generic_type.clear();
    clazz.superclass = None;
    clazz.mixins.clear();
    clazz.interfaces.clear();

    let mut expect = Expect::Nothing;
    for word in split_declaration(declaration) {
        let word = word.trim();
        if word.is_empty() {
            continue;
        }

        match word {
            "class" => expect = Expect::Name,
            "abstract" | "base" | "final" | "interface" | "sealed" | "mixin"
                if expect == Expect::Nothing && clazz.name.is_empty() =>
            {
                clazz.modifiers.push(word.to_string())
            }
            "extends" => expect = Expect::Superclass,
            "with" => expect = Expect::Mixins,
            "implements" => expect = Expect::Interfaces,
            _ => match expect {
                Expect::Name => {
                    expect = Expect::Nothing;
                    match (word.find('<'), word.rfind('>')) {
                        (Some(open), Some(close)) if close > open => {
                            clazz.full_generic_type = word[open..=close].to_string();
                            clazz.name = word[..open].to_string();
                        }
                        _ => clazz.name = word.to_string(),
                    }
                }
                Expect::Superclass => {
                    expect = Expect::Nothing;
                    clazz.superclass = Some(word.to_string());
                }
                Expect::Mixins => {
                    let mixin = remove_end(word, ",").trim();
                    if !mixin.is_empty() {
                        clazz.mixins.push(mixin.to_string());
                    }
                }
                Expect::Interfaces => {
                    let interface = remove_end(word, ",").trim();
                    if !interface.is_empty() {
                        clazz.interfaces.push(interface.to_string());
                    }
                }
                Expect::Nothing => {}
            },
        }
    }
}

/// Whether a line at class-body depth can declare a field.
fn is_field_line(line: &str, clazz: &DartClass) -> bool {
    let trimmed = line.trim_start();
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

    !trimmed.starts_with(clazz.name.as_str())
        && !trimmed.starts_with("//")
        && !includes_one(line, &["{", "}", "=>", "@"])
        && !includes_word(line, &["static", "set", "get", "return", "factory"])
        && !includes_all(line, &["final ", "="])
        && (clazz.constr_starts_at_line.is_none() || line.contains("final "))
        && !compact.ends_with(");")
}

/// Splits `final Map<String, dynamic> data;` into type and name. The name is
/// the word ending in `;` or followed by `=`; everything before it is type.
fn read_field(line: &str, line_pos: usize, key_format: KeyFormat) -> Option<Field> {
    let mut type_: Option<String> = None;
    let mut name: Option<String> = None;
    let mut is_final = false;
    let mut is_const = false;

    let words: Vec<&str> = line.trim().split(' ').collect();
    for (i, &word) in words.iter().enumerate() {
        if word.is_empty() || word == "{" || word == "}" {
            continue;
        }

        match word {
            "final" => {
                is_final = true;
                continue;
            }
            "const" if i == 0 => {
                is_const = true;
                continue;
            }
            "const" | "late" => continue,
            _ => {}
        }

        let followed_by_assign = words.get(i + 1).is_some_and(|next| *next == "=");
        let is_variable = (word.ends_with(';') || followed_by_assign) && !includes_one(word, &["(", ")"]);

        if is_variable {
            if name.is_none() {
                name = Some(remove_end(word, ";").to_string());
            }
        } else if let Some(t) = type_.as_mut() {
            if name.is_none() {
                t.push(' ');
                t.push_str(word);
            }
        } else {
            type_ = Some(word.to_string());
        }
    }

    let (type_, name) = (type_?, name?);
    let mut field = Field::new(&type_, &name, line_pos, key_format);
    field.is_final = is_final;
    field.is_const = is_const;
    Some(field)
}
